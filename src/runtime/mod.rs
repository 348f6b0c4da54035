//! Core runtime components.
//!
//! This module contains the coroutine pool, the scheduler that multiplexes
//! it onto the current thread, and the thread-local context that lets free
//! functions find the runtime they belong to.
//!
//! It is responsible for:
//! - enrolling coroutines into a fixed pool of slots,
//! - choosing the next coroutine to run through a pluggable policy,
//! - switching into new and suspended coroutines,
//! - reclaiming dead coroutines once they are waited on.
//!
//! Control never changes hands outside `yield_now` and `wait`.

mod core;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod scheduler;
pub(crate) mod yield_now;

pub mod coroutine;

pub use self::core::Runtime;
