//! Errors reported by the runtime.
//!
//! Only enrollment can fail recoverably. Every other failure mode of the
//! runtime is a broken invariant and panics at the point of detection.

use std::io;

/// Error returned by [`try_start`](crate::try_start).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every slot of the pool is occupied (running, suspended, or dead and
    /// not yet waited on).
    #[error("coroutine pool exhausted: all {capacity} slots are in use")]
    PoolExhausted {
        /// Total number of slots, the main coroutine included.
        capacity: usize,
    },

    /// The private stack of a fresh slot could not be mapped.
    #[error("failed to allocate a {size}-byte coroutine stack")]
    Stack {
        /// Requested usable stack size in bytes.
        size: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}
