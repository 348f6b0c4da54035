//! Execution-context switching.
//!
//! This module is the only place where the runtime manipulates raw stack
//! pointers. It exposes two operations:
//!
//! - [`switch`]: saves the callee-saved register set of the calling context
//!   and restores a previously saved one, so the caller resumes exactly where
//!   it called `switch` once some other context switches back to it,
//! - [`Context::cold`]: builds a context that, the first time it is switched
//!   to, starts executing an entry function at the top of a fresh stack.
//!
//! Everything above this module only moves [`Context`] values around and goes
//! through [`switch`].

#[cfg(not(all(unix, any(target_arch = "x86_64", target_arch = "aarch64"))))]
compile_error!("coro only supports x86_64 and aarch64 unix targets");

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "aarch64")]
use aarch64 as imp;
#[cfg(target_arch = "x86_64")]
use x86_64 as imp;

use std::ptr;

/// Required alignment of a stack top handed to [`Context::cold`].
pub(crate) const STACK_ALIGN: usize = 16;

/// Entry point of a cold-activated context.
///
/// It receives the opaque argument given to [`Context::cold`] and must never
/// return: there is no frame to return into.
pub(crate) type Entry = extern "C" fn(*const ()) -> !;

/// Saved execution state of a suspended context.
///
/// The registers themselves are spilled onto the suspended context's own
/// stack, so only the stack pointer needs to be stored here.
#[repr(C)]
#[derive(Debug)]
pub(crate) struct Context {
    /// Stack pointer at the last suspension point.
    sp: *mut u8,
}

impl Context {
    /// A context that has never been saved into.
    pub(crate) const fn empty() -> Self {
        Self {
            sp: ptr::null_mut(),
        }
    }

    /// Builds the initial context of a coroutine.
    ///
    /// Switching to the returned context redirects the stack pointer just
    /// below `top` and calls `entry(arg)`.
    ///
    /// # Safety
    ///
    /// - `top` must be the one-past-the-end address of a writable region
    ///   large enough to hold the initial frame and the coroutine's calls,
    /// - `top` must be aligned to [`STACK_ALIGN`],
    /// - the region must stay mapped for as long as the context may run.
    pub(crate) unsafe fn cold(top: *mut u8, entry: Entry, arg: *const ()) -> Self {
        debug_assert_eq!(top as usize % STACK_ALIGN, 0, "misaligned stack top");

        Self {
            sp: unsafe { imp::prepare(top, entry, arg) },
        }
    }

    /// Returns `true` once the context has been saved into or prepared.
    pub(crate) fn is_set(&self) -> bool {
        !self.sp.is_null()
    }
}

/// Suspends the calling context into `from` and resumes `to`.
///
/// Returns when another context switches back into `from`. `from` and `to`
/// may point to the same context, in which case the call returns immediately.
///
/// # Safety
///
/// - `from` must be valid for writes,
/// - `to` must hold a context produced by a previous `switch` or by
///   [`Context::cold`] whose stack is still mapped,
/// - a cold context must be switched to at most once.
pub(crate) unsafe fn switch(from: *mut Context, to: *const Context) {
    unsafe { imp::switch(from, to) }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::utils::Stack;

    use std::cell::Cell;

    thread_local! {
        static MAIN: Cell<*mut Context> = const { Cell::new(ptr::null_mut()) };
        static SIDE: Cell<*mut Context> = const { Cell::new(ptr::null_mut()) };
        static STEPS: Cell<usize> = const { Cell::new(0) };
    }

    extern "C" fn ping(arg: *const ()) -> ! {
        let rounds = arg as usize;

        for _ in 0..rounds {
            STEPS.with(|s| s.set(s.get() + 1));
            unsafe { switch(SIDE.get(), MAIN.get()) };
        }

        STEPS.with(|s| s.set(s.get() + 100));
        loop {
            unsafe { switch(SIDE.get(), MAIN.get()) };
        }
    }

    #[test]
    fn test_cold_activation_then_resume() {
        let stack = Stack::new(64 * 1024).unwrap();
        let mut main = Context::empty();
        let mut side = unsafe { Context::cold(stack.top(), ping, 3usize as *const ()) };

        assert!(side.is_set());
        let main: *mut Context = &mut main;
        let side: *mut Context = &mut side;
        MAIN.set(main);
        SIDE.set(side);

        for expected in 1..=3 {
            unsafe { switch(main, side) };
            assert_eq!(STEPS.get(), expected);
        }

        unsafe { switch(main, side) };
        assert_eq!(STEPS.get(), 103);
    }

    #[test]
    fn test_switch_to_self_returns() {
        let mut ctx = Context::empty();
        let this: *mut Context = &mut ctx;

        unsafe { switch(this, this) };

        assert!(unsafe { (*this).is_set() });
    }

    #[test]
    fn test_locals_survive_switch() {
        thread_local! {
            static HOME: Cell<*mut Context> = const { Cell::new(ptr::null_mut()) };
            static AWAY: Cell<*mut Context> = const { Cell::new(ptr::null_mut()) };
            static SUM: Cell<u64> = const { Cell::new(0) };
        }

        extern "C" fn sum(_: *const ()) -> ! {
            let values = [1u64, 2, 3, 4];
            let mut acc = 0;

            for v in values {
                acc += v;
                unsafe { switch(AWAY.get(), HOME.get()) };
            }

            SUM.set(acc);
            loop {
                unsafe { switch(AWAY.get(), HOME.get()) };
            }
        }

        let stack = Stack::new(64 * 1024).unwrap();
        let mut home = Context::empty();
        let mut away = unsafe { Context::cold(stack.top(), sum, ptr::null()) };
        let home: *mut Context = &mut home;
        let away: *mut Context = &mut away;
        HOME.set(home);
        AWAY.set(away);

        let local = std::hint::black_box(0xdead_beef_u64);
        for _ in 0..5 {
            unsafe { switch(home, away) };
            assert_eq!(local, 0xdead_beef);
        }

        assert_eq!(SUM.get(), 10);
    }
}
