//! Reward shaping for self-play training targets.
//!
//! A [`RewardFactory`] turns the raw terminal reward of a game into the
//! scaled value used both as the in-search terminal value and as the
//! training target. Two variants are provided:
//!
//! - [`LinearBoundedRewardFactory`] - clamp to a range, map linearly to `[0, 1]`
//! - [`RankedRewardFactory`] - binarize against a quantile of recent history
//!
//! # Example
//!
//! ```
//! use rlsearch_reward::{RewardConfig, RewardFactory};
//!
//! let config = RewardConfig::LinearBounded {
//!     min_reward: -10.0,
//!     max_reward: 0.0,
//!     target_min: 0.0,
//!     target_max: 1.0,
//! };
//! let mut factory = RewardFactory::from_config(&config).unwrap();
//! assert_eq!(factory.scale(-5.0, "run"), 0.5);
//! ```

mod config;
mod linear;
mod ranked;

pub use config::{RewardConfig, RewardConfigError};
pub use linear::LinearBoundedRewardFactory;
pub use ranked::RankedRewardFactory;

/// Reward post-processing, selected by configuration at construction time.
#[derive(Clone, Debug)]
pub enum RewardFactory {
    LinearBounded(LinearBoundedRewardFactory),
    Ranked(RankedRewardFactory),
}

impl RewardFactory {
    /// Build the factory described by `config`.
    pub fn from_config(config: &RewardConfig) -> Result<Self, RewardConfigError> {
        match *config {
            RewardConfig::LinearBounded {
                min_reward,
                max_reward,
                target_min,
                target_max,
            } => Ok(Self::LinearBounded(
                LinearBoundedRewardFactory::new(min_reward, max_reward)?
                    .with_target_range(target_min, target_max)?,
            )),
            RewardConfig::Ranked {
                buffer_min_size,
                buffer_max_size,
                alpha,
            } => Ok(Self::Ranked(RankedRewardFactory::new(
                buffer_min_size,
                buffer_max_size,
                alpha,
            )?)),
        }
    }

    /// Scale `raw_reward` for `run_id`, recording it in the factory's history.
    ///
    /// The raw reward itself is never modified.
    pub fn scale(&mut self, raw_reward: f64, run_id: &str) -> f64 {
        match self {
            Self::LinearBounded(f) => f.scale(raw_reward),
            Self::Ranked(f) => f.scale(raw_reward, run_id),
        }
    }

    /// Same rule as [`scale`](Self::scale) without touching the history.
    pub fn peek(&self, raw_reward: f64, run_id: &str) -> f64 {
        match self {
            Self::LinearBounded(f) => f.scale(raw_reward),
            Self::Ranked(f) => f.peek(raw_reward, run_id),
        }
    }

    /// Short variant name, used in logs and record metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LinearBounded(_) => "linear_bounded",
            Self::Ranked(_) => "ranked",
        }
    }
}

impl Default for RewardFactory {
    fn default() -> Self {
        Self::LinearBounded(LinearBoundedRewardFactory::default())
    }
}

impl From<LinearBoundedRewardFactory> for RewardFactory {
    fn from(f: LinearBoundedRewardFactory) -> Self {
        Self::LinearBounded(f)
    }
}

impl From<RankedRewardFactory> for RewardFactory {
    fn from(f: RankedRewardFactory) -> Self {
        Self::Ranked(f)
    }
}
