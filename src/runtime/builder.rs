use super::core::Runtime;
use super::scheduler::{Random, Schedule};

/// Default number of pool slots, the main coroutine included.
pub const DEFAULT_CAPACITY: usize = 128;

/// Default usable stack size of each coroutine (64 KiB).
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;

/// Smallest accepted stack size (16 KiB).
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Builder for configuring and creating a runtime.
///
/// `RuntimeBuilder` fixes the parameters that cannot change once a runtime
/// exists: the pool capacity, the size of every private stack and the
/// scheduling policy.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .capacity(16)
///     .stack_size(128 * 1024)
///     .seed(42)
///     .build();
/// ```
pub struct RuntimeBuilder {
    /// Number of pool slots, the main coroutine included.
    capacity: usize,

    /// Usable bytes of each private stack.
    stack_size: usize,

    /// Selection policy. Uniform random from OS entropy when unset.
    scheduler: Option<Box<dyn Schedule>>,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration:
    /// [`DEFAULT_CAPACITY`] slots, [`DEFAULT_STACK_SIZE`] stacks and
    /// entropy-seeded [`Random`] scheduling.
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            stack_size: DEFAULT_STACK_SIZE,
            scheduler: None,
        }
    }

    /// Sets the number of pool slots, the main coroutine included.
    ///
    /// # Panics
    ///
    /// Panics if `n < 2`: the pool needs room for the main coroutine and at
    /// least one other.
    pub fn capacity(mut self, n: usize) -> Self {
        assert!(n >= 2, "capacity must be >= 2");

        self.capacity = n;
        self
    }

    /// Sets the usable size of every coroutine stack, in bytes.
    ///
    /// The size is rounded up to the system page size. Stacks never grow:
    /// a coroutine overflowing its stack faults on a guard page.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is below [`MIN_STACK_SIZE`].
    pub fn stack_size(mut self, bytes: usize) -> Self {
        assert!(
            bytes >= MIN_STACK_SIZE,
            "stack_size must be >= {MIN_STACK_SIZE} bytes"
        );

        self.stack_size = bytes;
        self
    }

    /// Uses uniform random scheduling with a fixed seed.
    ///
    /// Two runtimes built with the same seed, driving the same program,
    /// interleave their coroutines identically.
    pub fn seed(self, seed: u64) -> Self {
        self.scheduler(Random::with_seed(seed))
    }

    /// Replaces the scheduling policy.
    pub fn scheduler<S>(mut self, scheduler: S) -> Self
    where
        S: Schedule + 'static,
    {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Builds the runtime with the configured options.
    ///
    /// Only the pool table is allocated here; stacks are mapped when a slot
    /// is first enrolled.
    pub fn build(self) -> Runtime {
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Box::new(Random::new()));

        Runtime::new(self.capacity, self.stack_size, scheduler)
    }
}

impl Default for RuntimeBuilder {
    /// Creates a default `RuntimeBuilder`.
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rt = RuntimeBuilder::new().build();

        assert_eq!(rt.capacity(), DEFAULT_CAPACITY);
        assert_eq!(rt.alive(), 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be >= 2")]
    fn test_capacity_too_small() {
        let _ = RuntimeBuilder::new().capacity(1);
    }

    #[test]
    #[should_panic(expected = "stack_size must be >=")]
    fn test_stack_too_small() {
        let _ = RuntimeBuilder::new().stack_size(1024);
    }
}
