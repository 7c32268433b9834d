//! Per-step metrics for the FSM environment.
//!
//! [`StepMetrics`] captures timing and episode counts for a single
//! `step()` call, plus running totals since construction.

/// Timing and episode metrics from the most recent step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the step, in microseconds.
    pub total_us: u64,
    /// Instances that hit a terminal state (and were auto-reset) this step.
    pub episodes_completed: u32,
    /// Cumulative steps since construction. `reset()` does not clear it.
    pub total_steps: u64,
    /// Cumulative completed episodes since construction.
    pub total_episodes: u64,
}

impl StepMetrics {
    /// Fold one step's results into the running totals.
    pub(crate) fn record_step(&mut self, elapsed_us: u64, episodes: u32) {
        self.total_us = elapsed_us;
        self.episodes_completed = episodes;
        self.total_steps += 1;
        self.total_episodes += u64::from(episodes);
    }
}
