//! Search configuration parameters.
//!
//! These parameters control the behavior of the search engines. They
//! deserialize from a run configuration file; missing fields take the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Identifier of the run; keys the reward history and stored games.
    pub run_id: String,

    /// Number of simulations per move (the iteration budget).
    pub num_simulations: usize,

    /// Optional wall-clock budget per move, in milliseconds.
    /// Whichever of the two budgets runs out first ends the search.
    pub time_limit_ms: Option<u64>,

    /// PUCT exploration constant.
    pub c_puct: f64,

    /// When set, the exploration constant grows with the parent's visits:
    /// c = c_puct + log((N + pb_c_base + 1) / pb_c_base)
    pub pb_c_base: Option<f64>,

    /// Mix Dirichlet noise into the root priors before each move's search.
    /// Self-play only; evaluation configs turn it off.
    pub dirichlet_noise: bool,

    /// Dirichlet noise alpha.
    /// Higher values = more uniform noise, lower = more concentrated.
    pub dirichlet_alpha: f64,

    /// Fraction of prior replaced with Dirichlet noise at root.
    pub exploration_fraction: f64,

    /// Temperature for action selection.
    /// - 0.0: always pick highest visit count (greedy)
    /// - 1.0: sample proportional to visit counts
    pub temperature: f64,

    /// Move number at which to drop temperature to 0 (greedy).
    /// Set to 0 to always use the configured temperature.
    pub temperature_drop_move: usize,

    /// Keep the vertex cache between runs instead of starting each game
    /// from an empty cache.
    pub reuse_cache: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            run_id: "default".to_string(),
            num_simulations: 256,
            time_limit_ms: None,
            c_puct: 1.25,
            pb_c_base: None,
            dirichlet_noise: true,
            dirichlet_alpha: 0.3,
            exploration_fraction: 0.25,
            temperature: 1.0,
            temperature_drop_move: 30,
            reuse_cache: false,
        }
    }
}

impl SearchConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config for evaluation (greedy action selection, no noise).
    pub fn for_evaluation(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            temperature: 0.0,
            temperature_drop_move: 0,
            dirichlet_noise: false,
            exploration_fraction: 0.0,
            ..Default::default()
        }
    }

    /// Get the effective temperature for a given move number.
    pub fn effective_temperature(&self, move_number: usize) -> f64 {
        if self.temperature_drop_move > 0 && move_number >= self.temperature_drop_move {
            0.0
        } else {
            self.temperature
        }
    }

    /// Exploration constant for a parent with `parent_visits` visits.
    pub fn exploration(&self, parent_visits: f64) -> f64 {
        match self.pb_c_base {
            Some(base) => self.c_puct + ((parent_visits + base + 1.0) / base).ln(),
            None => self.c_puct,
        }
    }

    /// The wall-clock budget, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}
