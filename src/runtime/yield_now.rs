use super::context::with_current;

/// Suspends the running coroutine and lets the scheduler run another one.
///
/// The call returns once the scheduler picks the caller again, with every
/// local on the caller's stack intact. Any new or suspended coroutine may
/// run in between, including none at all if the caller itself is drawn.
///
/// Callable from any coroutine, the main one included.
///
/// # Examples
///
/// ```rust,ignore
/// coro::start("ticker", || {
///     for tick in 0..3 {
///         println!("tick {tick}");
///         coro::yield_now();
///     }
/// });
/// ```
pub fn yield_now() {
    with_current(|core| core.suspend())
}
