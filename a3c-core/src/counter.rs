//! Process-wide counter of environment steps.
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts environment steps taken by all actor-learners.
///
/// Step numbers are handed out by [`GlobalStepCounter::try_advance`], which never goes
/// past the step budget. Each number in `1..=budget` is handed out exactly once.
/// A step number whose environment step was never taken is returned with
/// [`GlobalStepCounter::forfeit`] and excluded from [`GlobalStepCounter::n_taken`].
#[derive(Debug)]
pub struct GlobalStepCounter {
    steps: AtomicUsize,
    forfeited: AtomicUsize,
    budget: usize,
}

impl GlobalStepCounter {
    /// Constructs a counter starting at zero.
    pub fn new(budget: usize) -> Self {
        Self {
            steps: AtomicUsize::new(0),
            forfeited: AtomicUsize::new(0),
            budget,
        }
    }

    /// The step budget.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// The last step number handed out.
    pub fn get(&self) -> usize {
        self.steps.load(Ordering::Acquire)
    }

    /// Marks a handed out step number as not taken.
    pub fn forfeit(&self) {
        self.forfeited.fetch_add(1, Ordering::AcqRel);
    }

    /// The number of environment steps actually taken.
    pub fn n_taken(&self) -> usize {
        self.get() - self.forfeited.load(Ordering::Acquire)
    }

    /// Returns `true` if the budget is used up.
    pub fn is_exhausted(&self) -> bool {
        self.get() >= self.budget
    }

    /// Increments the counter and returns the new value, or `None` when the budget is
    /// already used up.
    pub fn try_advance(&self) -> Option<usize> {
        let budget = self.budget;
        self.steps
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                if t < budget {
                    Some(t + 1)
                } else {
                    None
                }
            })
            .ok()
            .map(|prev| prev + 1)
    }
}
