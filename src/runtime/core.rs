use super::context::{self, CURRENT};
use super::coroutine::{Coroutine, Handle, Status};
use super::scheduler::Schedule;
use crate::arch::{self, Context};
use crate::error::Error;
use crate::utils::Stack;

use std::cell::{Cell, RefCell, UnsafeCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// Slot of the coroutine standing for the thread's own control flow.
pub(crate) const MAIN: usize = 0;

/// Source of runtime identities, unique for the whole process.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A coroutine runtime.
///
/// A `Runtime` owns a fixed pool of coroutine slots, multiplexed onto the
/// thread that created it. Control only changes hands when the running
/// coroutine calls [`yield_now`](crate::yield_now) or
/// [`wait`](crate::wait); nothing is preempted.
///
/// The thread itself is the *main coroutine*: it is pre-registered in slot
/// `0` as running, so the API can be used without any setup step.
///
/// The free functions ([`start`](crate::start), [`yield_now`](crate::yield_now),
/// [`wait`](crate::wait), ...) act on the thread's current runtime. Inside
/// [`block_on`](Self::block_on) and inside every coroutine it runs, that is
/// this runtime.
///
/// Dropping the runtime unmaps every stack. Coroutines that are still
/// suspended at that point never resume and their frames are never unwound.
pub struct Runtime {
    /// Boxed so the address handed to cold-activated coroutines is stable.
    core: Box<Core>,
}

impl Runtime {
    pub(crate) fn new(capacity: usize, stack_size: usize, scheduler: Box<dyn Schedule>) -> Self {
        Self {
            core: Box::new(Core::new(capacity, stack_size, scheduler)),
        }
    }

    /// Runs `f` on the main coroutine with this runtime installed as the
    /// thread's current runtime.
    ///
    /// Coroutines started inside `f` only make progress while `f` suspends.
    /// The ones still pending when `f` returns stay in the pool until this
    /// runtime is entered again.
    ///
    /// # Panics
    ///
    /// Panics if called from inside one of this runtime's own coroutines.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let rt = RuntimeBuilder::new().build();
    ///
    /// let total = rt.block_on(|| {
    ///     let handle = coro::start("worker", || coro::yield_now());
    ///     coro::wait(handle);
    ///     42
    /// });
    /// assert_eq!(total, 42);
    /// ```
    pub fn block_on<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        assert_eq!(
            self.core.current.get(),
            MAIN,
            "block_on called from inside a coroutine of the same runtime"
        );

        context::enter(&self.core, f)
    }

    /// Number of live coroutines, main included.
    pub fn alive(&self) -> usize {
        self.core.alive()
    }

    /// Number of pool slots, main included.
    pub fn capacity(&self) -> usize {
        self.core.slots.len()
    }

    pub(crate) fn core(&self) -> &Core {
        &self.core
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !thread::panicking() {
            assert_eq!(
                self.core.current.get(),
                MAIN,
                "runtime dropped from inside one of its coroutines"
            );
        }
    }
}

/// Shared state of a runtime.
///
/// Every access happens on the owning thread, from whichever coroutine is
/// running. No borrow of a slot is held across a context switch.
pub(crate) struct Core {
    /// Identity stamped into every handle this runtime hands out.
    id: u64,

    /// The pool. Slot [`MAIN`] is the thread's own control flow.
    slots: Box<[UnsafeCell<Coroutine>]>,

    /// Slot of the running coroutine.
    current: Cell<usize>,

    /// Live coroutines (new, running or waiting), main included.
    alive: Cell<usize>,

    scheduler: RefCell<Box<dyn Schedule>>,

    /// Usable size of every private stack.
    stack_size: usize,
}

impl Core {
    fn new(capacity: usize, stack_size: usize, scheduler: Box<dyn Schedule>) -> Self {
        let slots = (0..capacity)
            .map(|i| {
                UnsafeCell::new(if i == MAIN {
                    Coroutine::main()
                } else {
                    Coroutine::free()
                })
            })
            .collect();

        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            slots,
            current: Cell::new(MAIN),
            alive: Cell::new(1),
            scheduler: RefCell::new(scheduler),
            stack_size,
        }
    }

    /// Raw access to a slot.
    ///
    /// Callers turn it into a reference only for straight-line code that
    /// never reaches [`arch::switch`].
    fn slot(&self, index: usize) -> *mut Coroutine {
        self.slots[index].get()
    }

    /// Status of the slot at `index`.
    fn status_of(&self, index: usize) -> Status {
        unsafe { (*self.slot(index)).status }
    }

    pub(crate) fn alive(&self) -> usize {
        self.alive.get()
    }

    pub(crate) fn current_name(&self) -> String {
        unsafe { (*self.slot(self.current.get())).name.clone() }
    }

    /// Enrolls `entry` in the first free slot.
    pub(crate) fn start(&self, name: &str, entry: Box<dyn FnOnce()>) -> Result<Handle, Error> {
        let index = (0..self.slots.len())
            .find(|&i| self.status_of(i) == Status::Free)
            .ok_or(Error::PoolExhausted {
                capacity: self.slots.len(),
            })?;

        let record = unsafe { &mut *self.slot(index) };

        if record.stack.is_none() {
            let stack = Stack::new(self.stack_size).map_err(|source| Error::Stack {
                size: self.stack_size,
                source,
            })?;
            log::debug!("mapped a {}-byte stack for slot {index}", stack.size());
            record.stack = Some(stack);
        }

        record.enroll(name, entry);
        self.alive.set(self.alive.get() + 1);

        log::debug!("coroutine `{}` enrolled in slot {index}", record.name);

        Ok(Handle::new(
            self.id,
            index,
            record.generation,
            record.name.clone(),
        ))
    }

    /// Suspends the running coroutine and lets the scheduler pick the next.
    ///
    /// Returns once the scheduler picks the caller again.
    pub(crate) fn suspend(&self) {
        let record = unsafe { &mut *self.slot(self.current.get()) };

        assert_eq!(
            record.status,
            Status::Running,
            "coroutine `{}` suspended while not running",
            record.name
        );
        record.status = Status::Waiting;

        self.schedule();
    }

    /// Suspends the caller until the coroutine behind `handle` is dead, then
    /// reclaims its slot.
    pub(crate) fn wait(&self, handle: Handle) {
        let target = handle.index;

        assert!(
            self.holds(&handle),
            "handle for `{}` does not refer to a live coroutine of this runtime",
            handle.name()
        );
        assert_ne!(
            target,
            self.current.get(),
            "coroutine `{}` cannot wait on itself",
            handle.name()
        );

        while self.status_of(target) != Status::Dead {
            self.suspend();
        }

        let payload = unsafe { (*self.slot(target)).reclaim() };
        log::debug!("coroutine `{}` reclaimed from slot {target}", handle.name());

        if let Some(payload) = payload {
            panic::resume_unwind(payload);
        }
    }

    pub(crate) fn status(&self, handle: &Handle) -> Status {
        if self.holds(handle) {
            self.status_of(handle.index)
        } else {
            Status::Free
        }
    }

    /// Returns `true` if `handle` was issued by this runtime and matches the
    /// current occupant of its slot.
    fn holds(&self, handle: &Handle) -> bool {
        handle.runtime == self.id
            && handle.index != MAIN
            && handle.index < self.slots.len()
            && unsafe {
                let record = &*self.slot(handle.index);
                record.generation == handle.generation && record.status != Status::Free
            }
    }

    /// Picks the next coroutine and switches into it.
    ///
    /// The caller must already have left the running state (waiting or
    /// dead). Returns only if the caller was waiting and gets picked again.
    fn schedule(&self) {
        let from = self.current.get();

        assert_ne!(
            self.status_of(from),
            Status::Running,
            "scheduler entered while a coroutine is still running"
        );

        let eligible = (0..self.slots.len())
            .filter(|&i| self.status_of(i).is_eligible())
            .count();
        assert!(eligible > 0, "no runnable coroutine left");

        let pick = self.scheduler.borrow_mut().pick(eligible);
        assert!(
            pick < eligible,
            "scheduler picked {pick} out of {eligible} eligible coroutines"
        );

        let target = (0..self.slots.len())
            .filter(|&i| self.status_of(i).is_eligible())
            .nth(pick)
            .expect("eligible coroutine vanished");

        let record = unsafe { &mut *self.slot(target) };
        let prior = record.status;

        record.status = Status::Running;
        self.current.set(target);

        log::trace!("switching to `{}` (slot {target}, {prior:?})", record.name);

        assert!(
            prior == Status::New || record.context.is_set(),
            "suspended coroutine has no saved context"
        );

        if prior == Status::New {
            let top = record
                .stack
                .as_ref()
                .expect("enrolled coroutine has no stack")
                .top();
            let core = (self as *const Core).cast::<()>();

            // Safety: the stack is owned by the slot, stays mapped until the
            // runtime is dropped and is not in use by anyone else.
            record.context = unsafe { Context::cold(top, trampoline, core) };
        }

        let prev = CURRENT.with(|c| c.replace(self));

        // Safety: both contexts live in the pool, which outlives every
        // coroutine. `from` is either the caller's own slot or a dead slot
        // that is never resumed.
        unsafe {
            let from = &raw mut (*self.slot(from)).context;
            let to = &raw const (*self.slot(target)).context;

            arch::switch(from, to);
        }

        CURRENT.with(|c| c.set(prev));
    }

    /// Runs the entry function of the running coroutine and marks it dead.
    fn run_current(&self) {
        let index = self.current.get();

        let entry = unsafe { (*self.slot(index)).entry.take() }
            .expect("activated coroutine has no entry function");

        let outcome = panic::catch_unwind(AssertUnwindSafe(entry));

        let record = unsafe { &mut *self.slot(index) };

        if let Err(payload) = outcome {
            log::warn!("coroutine `{}` panicked", record.name);
            record.panic = Some(payload);
        }

        record.status = Status::Dead;
        self.alive.set(self.alive.get() - 1);
        assert!(self.alive.get() > 0, "main coroutine is not accounted for");

        log::debug!("coroutine `{}` finished", record.name);
    }
}

/// First frame of every coroutine stack.
///
/// Runs the entry function, then hands the thread to another coroutine.
/// A dead coroutine is never picked again, so this never returns. Any panic
/// escaping here crosses an `extern "C"` boundary and aborts the process.
extern "C" fn trampoline(core: *const ()) -> ! {
    // Safety: `core` is the address of the boxed `Core` that activated us.
    let core = unsafe { &*core.cast::<Core>() };

    core.run_current();
    core.schedule();

    unreachable!("dead coroutine resumed");
}
