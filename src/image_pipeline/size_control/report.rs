use std::time::{Duration, Instant};

use tracing::info;

/// How a budgeted run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetOutcome {
    /// A preset produced output within the budget
    Accepted,
    /// No preset fit; the last candidate was written anyway
    Exhausted,
}

/// One encode attempt of the degradation loop
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub preset_index: usize,
    /// Output size, `None` when the trial failed
    pub size: Option<u64>,
    pub duration: Duration,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BudgetReport {
    pub outcome: BudgetOutcome,
    /// Ladder index of the preset whose output was written
    pub preset_index: usize,
    /// Size of the written output
    pub size: u64,
    pub max_bytes: u64,
    trials: Vec<TrialRecord>,
}

impl BudgetReport {
    pub fn new(
        outcome: BudgetOutcome,
        preset_index: usize,
        size: u64,
        max_bytes: u64,
        trials: Vec<TrialRecord>,
    ) -> Self {
        Self {
            outcome,
            preset_index,
            size,
            max_bytes,
            trials,
        }
    }

    pub fn within_budget(&self) -> bool {
        self.size <= self.max_bytes
    }

    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn total_duration(&self) -> Duration {
        self.trials.iter().map(|t| t.duration).sum()
    }

    pub fn log_summary(&self) {
        for trial in &self.trials {
            match (&trial.size, &trial.error) {
                (Some(size), _) => info!(
                    preset = trial.preset_index,
                    size,
                    ms = trial.duration.as_secs_f64() * 1000.0,
                    "Trial"
                ),
                (None, error) => info!(
                    preset = trial.preset_index,
                    error = error.as_deref().unwrap_or("unknown"),
                    ms = trial.duration.as_secs_f64() * 1000.0,
                    "Trial failed"
                ),
            }
        }
        info!(
            outcome = ?self.outcome,
            preset = self.preset_index,
            size = self.size,
            max_bytes = self.max_bytes,
            total_ms = self.total_duration().as_secs_f64() * 1000.0,
            "Size budget summary"
        );
    }
}

pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
