use std::marker::PhantomData;

/// An owned reference to an enrolled coroutine.
///
/// A `Handle` is returned by [`start`](crate::start) and consumed by
/// [`wait`](crate::wait), so each coroutine is waited on at most once.
///
/// Dropping a handle does **not** cancel the coroutine. It keeps running
/// to completion, but its slot is never reclaimed.
#[derive(Debug)]
#[must_use = "a coroutine's slot is only reclaimed once its handle is waited on"]
pub struct Handle {
    /// Identity of the runtime that enrolled the coroutine.
    pub(crate) runtime: u64,

    /// Slot index in the pool.
    pub(crate) index: usize,

    /// Slot generation at enrollment time.
    pub(crate) generation: u64,

    /// Name given at enrollment, already bounded.
    name: String,

    /// Handles are bound to the thread owning the runtime.
    _not_send: PhantomData<*const ()>,
}

impl Handle {
    pub(crate) fn new(runtime: u64, index: usize, generation: u64, name: String) -> Self {
        Self {
            runtime,
            index,
            generation,
            name,
            _not_send: PhantomData,
        }
    }

    /// Index of the pool slot this coroutine occupies.
    ///
    /// Slot `0` is the main coroutine and is never handed out.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name the coroutine was started with, truncated to
    /// [`MAX_NAME_LEN`](crate::MAX_NAME_LEN) bytes.
    pub fn name(&self) -> &str {
        &self.name
    }
}
