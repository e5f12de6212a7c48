use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid reward factory parameters.
#[derive(Error, Debug, PartialEq)]
pub enum RewardConfigError {
    #[error("reward bounds must be finite with min < max (got [{min}, {max}])")]
    InvalidBounds { min: f64, max: f64 },

    #[error("ranked reward alpha must be in [0, 1] (got {0})")]
    InvalidAlpha(f64),

    #[error("ranked reward buffer sizes must satisfy 0 < min <= max (got min={min}, max={max})")]
    InvalidBufferSize { min: usize, max: usize },
}

/// Reward factory choice and parameters, as read from a run configuration.
///
/// ```
/// use rlsearch_reward::RewardConfig;
///
/// let config: RewardConfig = serde_json::from_str(
///     r#"{"kind": "ranked", "buffer_min_size": 20, "buffer_max_size": 20, "alpha": 0.75}"#,
/// ).unwrap();
/// assert!(matches!(config, RewardConfig::Ranked { .. }));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardConfig {
    LinearBounded {
        min_reward: f64,
        max_reward: f64,
        #[serde(default)]
        target_min: f64,
        #[serde(default = "default_target_max")]
        target_max: f64,
    },
    Ranked {
        buffer_min_size: usize,
        buffer_max_size: usize,
        alpha: f64,
    },
}

fn default_target_max() -> f64 {
    1.0
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::LinearBounded {
            min_reward: 0.0,
            max_reward: 1.0,
            target_min: 0.0,
            target_max: 1.0,
        }
    }
}
