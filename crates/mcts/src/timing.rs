//! Explicit per-phase timing of the search loop.

use std::fmt;
use std::time::Duration;

/// A phase of one search iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Select,
    Expand,
    Evaluate,
    Backprop,
}

/// Accumulated wall-clock time per phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchTimings {
    pub select: Duration,
    pub expand: Duration,
    pub evaluate: Duration,
    pub backprop: Duration,

    /// Completed search iterations.
    pub iterations: u64,

    /// Evaluator calls.
    pub evaluations: u64,
}

impl SearchTimings {
    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        match phase {
            Phase::Select => self.select += elapsed,
            Phase::Expand => self.expand += elapsed,
            Phase::Evaluate => {
                self.evaluate += elapsed;
                self.evaluations += 1;
            }
            Phase::Backprop => {
                self.backprop += elapsed;
                self.iterations += 1;
            }
        }
    }

    pub fn get(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Select => self.select,
            Phase::Expand => self.expand,
            Phase::Evaluate => self.evaluate,
            Phase::Backprop => self.backprop,
        }
    }

    pub fn total(&self) -> Duration {
        self.select + self.expand + self.evaluate + self.backprop
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for SearchTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} evaluations | select {:.3}s expand {:.3}s evaluate {:.3}s backprop {:.3}s",
            self.iterations,
            self.evaluations,
            self.select.as_secs_f64(),
            self.expand.as_secs_f64(),
            self.evaluate.as_secs_f64(),
            self.backprop.as_secs_f64(),
        )
    }
}
