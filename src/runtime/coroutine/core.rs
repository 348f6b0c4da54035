use super::{Handle, Status};
use crate::error::Error;
use crate::runtime::context::with_current;

/// Enrolls `f` as a new coroutine on the current runtime.
///
/// The coroutine does not run until the scheduler picks it, which only
/// happens when the caller (or another coroutine) suspends through
/// [`yield_now`](crate::yield_now) or [`wait`].
///
/// `f` carries both the entry function and whatever argument it captured.
/// `name` is informational and truncated to
/// [`MAX_NAME_LEN`](crate::MAX_NAME_LEN) bytes.
///
/// # Panics
///
/// Panics if every slot of the pool is in use. The pool has a fixed
/// capacity (see [`RuntimeBuilder::capacity`](crate::RuntimeBuilder::capacity))
/// and exhausting it is treated as a design-limit violation. Use
/// [`try_start`] to handle it instead.
///
/// # Examples
///
/// ```rust,ignore
/// let handle = coro::start("worker", || {
///     for _ in 0..3 {
///         coro::yield_now();
///     }
/// });
///
/// coro::wait(handle);
/// ```
pub fn start<F>(name: &str, f: F) -> Handle
where
    F: FnOnce() + 'static,
{
    match try_start(name, f) {
        Ok(handle) => handle,
        Err(err) => panic!("{err}"),
    }
}

/// Enrolls `f` as a new coroutine, reporting exhaustion instead of panicking.
///
/// # Errors
///
/// - [`Error::PoolExhausted`] if no slot is free,
/// - [`Error::Stack`] if the slot's private stack could not be mapped.
pub fn try_start<F>(name: &str, f: F) -> Result<Handle, Error>
where
    F: FnOnce() + 'static,
{
    with_current(|core| core.start(name, Box::new(f)))
}

/// Blocks the calling coroutine until the coroutine behind `handle` is dead,
/// then returns its slot to the pool.
///
/// Waiting does not spin: every check that finds the target still alive
/// suspends the caller exactly like [`yield_now`](crate::yield_now).
///
/// If the coroutine's body panicked, the panic is resumed here.
///
/// # Panics
///
/// - if `handle` belongs to the calling coroutine itself,
/// - if `handle` does not refer to a live enrollment of the current runtime,
/// - if the waited coroutine panicked.
pub fn wait(handle: Handle) {
    with_current(|core| core.wait(handle))
}

/// Returns the status of the coroutine behind `handle`.
///
/// A handle whose slot was reclaimed and re-enrolled reports
/// [`Status::Free`].
pub fn status(handle: &Handle) -> Status {
    with_current(|core| core.status(handle))
}

/// Number of live coroutines on the current runtime, main included.
///
/// Dead coroutines are not counted, even before they are waited on.
pub fn alive() -> usize {
    with_current(|core| core.alive())
}

/// Name of the coroutine currently running.
pub fn current_name() -> String {
    with_current(|core| core.current_name())
}
