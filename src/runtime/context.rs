use super::core::{Core, Runtime};
use super::builder::RuntimeBuilder;

use std::cell::{Cell, OnceCell};
use std::ptr;

thread_local! {
    /// Runtime whose coroutine is executing on this thread.
    ///
    /// Set by [`Runtime::block_on`] for the main coroutine and by the
    /// scheduler whenever it switches into one of its coroutines. Null when
    /// no runtime was entered explicitly.
    pub(crate) static CURRENT: Cell<*const Core> = const { Cell::new(ptr::null()) };

    /// Runtime used by the free functions when none was entered.
    ///
    /// Built with the default configuration on first use. The thread that
    /// first touches it becomes its main coroutine.
    static DEFAULT: OnceCell<Runtime> = const { OnceCell::new() };
}

/// Runs `f` against the thread's current runtime.
///
/// Falls back to the lazily-initialized default runtime of this thread.
pub(crate) fn with_current<R>(f: impl FnOnce(&Core) -> R) -> R {
    let core = CURRENT.with(Cell::get);

    if !core.is_null() {
        // Safety: `CURRENT` only ever holds a core whose runtime is alive;
        // it is reset before the runtime can be dropped.
        return f(unsafe { &*core });
    }

    DEFAULT.with(|rt| f(rt.get_or_init(|| RuntimeBuilder::new().build()).core()))
}

/// Installs `core` as the current runtime for the duration of `f`.
///
/// The previous runtime is restored afterwards, even if `f` panics.
pub(crate) fn enter<R>(core: &Core, f: impl FnOnce() -> R) -> R {
    struct Restore(*const Core);

    impl Drop for Restore {
        fn drop(&mut self) {
            CURRENT.with(|c| c.set(self.0));
        }
    }

    let _restore = Restore(CURRENT.with(|c| c.replace(core)));

    f()
}
