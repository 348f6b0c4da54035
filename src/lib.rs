//! # coro
//!
//! **coro** is a minimal stackful coroutine runtime: a fixed pool of
//! lightweight execution contexts multiplexed onto a single thread, with
//! control passed explicitly by the coroutines themselves.
//!
//! Each coroutine runs on its own private, fixed-size stack. There is no
//! preemption: a coroutine keeps the thread until it calls [`yield_now`],
//! calls [`wait`], or returns. Which coroutine runs next is drawn uniformly
//! at random among the ones ready to run, unless another [`Schedule`] is
//! plugged in.
//!
//! - [`start`] enrolls a closure as a new coroutine,
//! - [`yield_now`] suspends the caller and lets another coroutine run,
//! - [`wait`] suspends the caller until a coroutine finishes, then frees its
//!   slot.
//!
//! The calling thread is itself the *main coroutine*, so these functions
//! work without any setup. The first call on a thread lazily builds a
//! default [`Runtime`]; use [`RuntimeBuilder`] and [`Runtime::block_on`] to
//! pick the capacity, stack size or scheduling policy.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let handles: Vec<_> = ["a", "b", "c"]
//!     .into_iter()
//!     .map(|name| {
//!         let log = log.clone();
//!         coro::start(name, move || {
//!             for i in 0..3 {
//!                 log.borrow_mut().push((name, i));
//!                 coro::yield_now();
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     coro::wait(handle);
//! }
//!
//! assert_eq!(log.borrow().len(), 9);
//! ```
//!
//! ## Limitations
//!
//! - Everything happens on one thread; handles and runtimes are `!Send`.
//! - Stacks never grow. Overflowing one faults on its guard page.
//! - A coroutine that neither yields nor returns starves all the others.
//! - A dead coroutine keeps its slot until someone waits on it.
//! - Only `x86_64` and `aarch64` unix targets are supported.

mod arch;
mod error;
mod runtime;
mod utils;

pub use error::Error;
pub use runtime::Runtime;
pub use runtime::builder::{DEFAULT_CAPACITY, DEFAULT_STACK_SIZE, MIN_STACK_SIZE, RuntimeBuilder};
pub use runtime::coroutine::{
    Handle, MAX_NAME_LEN, Status, alive, current_name, start, status, try_start, wait,
};
pub use runtime::scheduler::{Random, Schedule};
pub use runtime::yield_now::yield_now;
