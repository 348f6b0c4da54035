//! Scheduling policies.
//!
//! The runtime decides *which* coroutines may run (those that are new or
//! suspended); a [`Schedule`] decides *which one* of them runs next.
//!
//! The default policy, [`Random`], picks uniformly at random. Over many
//! decisions every eligible coroutine gets a roughly even share of the
//! thread without the runtime tracking any per-coroutine history.

/// A policy choosing the next coroutine to run.
///
/// The runtime collects the eligible coroutines in pool order and asks the
/// policy for a position among them.
///
/// Closures `FnMut(usize) -> usize` implement this trait, which makes
/// deterministic interleavings easy to set up in tests:
///
/// ```rust,ignore
/// // Always resume the lowest-indexed eligible slot.
/// let rt = RuntimeBuilder::new().scheduler(|_: usize| 0).build();
/// ```
pub trait Schedule {
    /// Returns a position in `0..eligible`.
    ///
    /// `eligible` is never zero. Returning an out-of-range position is a
    /// fatal error.
    fn pick(&mut self, eligible: usize) -> usize;
}

impl<F> Schedule for F
where
    F: FnMut(usize) -> usize,
{
    fn pick(&mut self, eligible: usize) -> usize {
        self(eligible)
    }
}

/// Uniform random selection among eligible coroutines.
#[derive(Debug, Clone)]
pub struct Random {
    rng: fastrand::Rng,
}

impl Random {
    /// Creates a policy seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a policy with a fixed seed, producing reproducible
    /// interleavings.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule for Random {
    fn pick(&mut self, eligible: usize) -> usize {
        self.rng.usize(..eligible)
    }
}
