//! Coroutine records and the free-function API.
//!
//! This module defines what a coroutine is from the runtime's point of
//! view (a pool slot with a status, a saved context and a private stack)
//! and the functions user code calls to enroll and reap coroutines on the
//! thread's current runtime.

pub(crate) mod handle;
pub(crate) mod record;
pub(crate) mod state;

pub(crate) use record::Coroutine;

pub mod core;

pub use self::core::{alive, current_name, start, status, try_start, wait};
pub use handle::Handle;
pub use record::MAX_NAME_LEN;
pub use state::Status;
