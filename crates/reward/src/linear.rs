use crate::RewardConfigError;

/// Clamps raw rewards into `[min_reward, max_reward]` and maps them linearly
/// onto `[target_min, target_max]` (default `[0, 1]`). Stateless.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearBoundedRewardFactory {
    min_reward: f64,
    max_reward: f64,
    target_min: f64,
    target_max: f64,
}

impl LinearBoundedRewardFactory {
    pub fn new(min_reward: f64, max_reward: f64) -> Result<Self, RewardConfigError> {
        check_bounds(min_reward, max_reward)?;
        Ok(Self {
            min_reward,
            max_reward,
            target_min: 0.0,
            target_max: 1.0,
        })
    }

    /// Map onto `[target_min, target_max]` instead of `[0, 1]`.
    pub fn with_target_range(
        mut self,
        target_min: f64,
        target_max: f64,
    ) -> Result<Self, RewardConfigError> {
        check_bounds(target_min, target_max)?;
        self.target_min = target_min;
        self.target_max = target_max;
        Ok(self)
    }

    pub fn scale(&self, raw_reward: f64) -> f64 {
        let clamped = raw_reward.clamp(self.min_reward, self.max_reward);
        let unit = (clamped - self.min_reward) / (self.max_reward - self.min_reward);
        self.target_min + unit * (self.target_max - self.target_min)
    }
}

impl Default for LinearBoundedRewardFactory {
    fn default() -> Self {
        Self {
            min_reward: 0.0,
            max_reward: 1.0,
            target_min: 0.0,
            target_max: 1.0,
        }
    }
}

fn check_bounds(min: f64, max: f64) -> Result<(), RewardConfigError> {
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(RewardConfigError::InvalidBounds { min, max });
    }
    Ok(())
}
