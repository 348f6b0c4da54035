/// Lifecycle status of a coroutine slot.
///
/// ```text
/// Free -> New -> Running <-> Waiting
///                   |
///                   v
///                 Dead -> (waited on) -> Free
/// ```
///
/// The main coroutine starts `Running` and never dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The slot holds no coroutine and may be enrolled.
    Free,

    /// Enrolled but never scheduled. Its stack pointer is not set up yet.
    New,

    /// Currently executing. Exactly one slot is in this state at a time.
    Running,

    /// Suspended in `yield_now` or `wait`, ready to be resumed.
    Waiting,

    /// The entry function returned (or panicked). The slot stays occupied
    /// until some coroutine waits on it.
    Dead,
}

impl Status {
    /// Returns `true` if the scheduler may pick a coroutine in this state.
    pub(crate) fn is_eligible(self) -> bool {
        matches!(self, Status::New | Status::Waiting)
    }
}
