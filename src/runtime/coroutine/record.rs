use super::Status;
use crate::arch::Context;
use crate::utils::Stack;

use std::any::Any;

/// Maximum length of a coroutine name, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Name of the coroutine that represents the thread's own control flow.
pub(crate) const MAIN_NAME: &str = "main";

/// A panic payload captured from a coroutine body.
pub(crate) type Payload = Box<dyn Any + Send + 'static>;

/// One slot of the coroutine pool.
pub(crate) struct Coroutine {
    /// Informational name, at most [`MAX_NAME_LEN`] bytes.
    pub(crate) name: String,

    /// Entry function with its captured argument. Taken on activation.
    pub(crate) entry: Option<Box<dyn FnOnce()>>,

    pub(crate) status: Status,

    /// Execution state saved at the last suspension point.
    pub(crate) context: Context,

    /// Private stack. Mapped on the slot's first enrollment and kept for
    /// every later occupant. The main coroutine runs on the thread's stack
    /// and has none.
    pub(crate) stack: Option<Stack>,

    /// Bumped on every reclamation so stale handles can be told apart.
    pub(crate) generation: u64,

    /// Panic raised by the entry function, re-raised in the waiter.
    pub(crate) panic: Option<Payload>,
}

impl Coroutine {
    /// An empty slot.
    pub(crate) fn free() -> Self {
        Self {
            name: String::new(),
            entry: None,
            status: Status::Free,
            context: Context::empty(),
            stack: None,
            generation: 0,
            panic: None,
        }
    }

    /// The pre-registered slot for the thread's own control flow.
    pub(crate) fn main() -> Self {
        Self {
            name: MAIN_NAME.to_owned(),
            status: Status::Running,
            ..Self::free()
        }
    }

    /// Populates a free slot. The stack, if any, is kept as is.
    pub(crate) fn enroll(&mut self, name: &str, entry: Box<dyn FnOnce()>) {
        debug_assert_eq!(self.status, Status::Free);

        self.name = bounded(name).to_owned();
        self.entry = Some(entry);
        self.context = Context::empty();
        self.status = Status::New;
    }

    /// Returns a dead slot to the pool and hands back its panic, if any.
    ///
    /// Nothing from the previous occupant but its stack mapping survives.
    pub(crate) fn reclaim(&mut self) -> Option<Payload> {
        debug_assert_eq!(self.status, Status::Dead);

        let panic = self.panic.take();

        self.name.clear();
        self.entry = None;
        self.context = Context::empty();
        self.status = Status::Free;
        self.generation += 1;

        panic
    }
}

/// Truncates `name` to at most [`MAX_NAME_LEN`] bytes on a char boundary.
pub(crate) fn bounded(name: &str) -> &str {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }

    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_keeps_short_names() {
        assert_eq!(bounded("worker"), "worker");
    }

    #[test]
    fn test_bounded_truncates_on_char_boundary() {
        let long = "é".repeat(MAX_NAME_LEN);
        let cut = bounded(&long);

        assert!(cut.len() <= MAX_NAME_LEN);
        assert_eq!(cut.len(), MAX_NAME_LEN);
        assert!(cut.chars().all(|c| c == 'é'));

        let odd = format!("a{}", "é".repeat(MAX_NAME_LEN));
        assert_eq!(bounded(&odd).len(), MAX_NAME_LEN - 1);
    }

    #[test]
    fn test_reclaim_clears_previous_occupant() {
        let mut slot = Coroutine::free();
        slot.enroll("first", Box::new(|| {}));
        slot.entry = None;
        slot.status = Status::Dead;
        slot.panic = Some(Box::new("boom"));

        let panic = slot.reclaim();

        assert!(panic.is_some());
        assert_eq!(slot.status, Status::Free);
        assert!(slot.name.is_empty());
        assert!(slot.entry.is_none());
        assert!(slot.panic.is_none());
        assert!(!slot.context.is_set());
        assert_eq!(slot.generation, 1);
    }
}
