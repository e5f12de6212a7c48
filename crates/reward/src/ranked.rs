//! Ranked reward: binarize a game's raw reward against recent history.
//!
//! A game scores `+1` when it beats the `alpha` quantile of the newest
//! `buffer_max_size` raw rewards of its run, `-1` when it falls below it and
//! `0` on an exact tie. The quantile is computed over the history *before* the
//! new reward is inserted, so a game is never compared against itself.

use crate::RewardConfigError;
use rlsearch_core::{GameStore, StoreError};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Scaled value returned while a run's buffer holds fewer than
/// `buffer_min_size` rewards.
pub const NEUTRAL_REWARD: f64 = 0.0;

#[derive(Clone, Debug)]
pub struct RankedRewardFactory {
    buffer_min_size: usize,
    buffer_max_size: usize,
    alpha: f64,
    buffers: FxHashMap<String, VecDeque<f64>>,
}

impl RankedRewardFactory {
    pub fn new(
        buffer_min_size: usize,
        buffer_max_size: usize,
        alpha: f64,
    ) -> Result<Self, RewardConfigError> {
        if buffer_min_size == 0 || buffer_min_size > buffer_max_size {
            return Err(RewardConfigError::InvalidBufferSize {
                min: buffer_min_size,
                max: buffer_max_size,
            });
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RewardConfigError::InvalidAlpha(alpha));
        }

        Ok(Self {
            buffer_min_size,
            buffer_max_size,
            alpha,
            buffers: FxHashMap::default(),
        })
    }

    /// Compare `raw_reward` against the run's history, then record it.
    pub fn scale(&mut self, raw_reward: f64, run_id: &str) -> f64 {
        let scaled = self.peek(raw_reward, run_id);
        self.record(raw_reward, run_id);
        scaled
    }

    /// Compare `raw_reward` against the run's history without recording it.
    pub fn peek(&self, raw_reward: f64, run_id: &str) -> f64 {
        let Some(buffer) = self.buffers.get(run_id) else {
            return NEUTRAL_REWARD;
        };
        if buffer.len() < self.buffer_min_size {
            return NEUTRAL_REWARD;
        }

        let r_alpha = quantile(buffer, self.alpha);
        if raw_reward > r_alpha {
            1.0
        } else if raw_reward < r_alpha {
            -1.0
        } else {
            0.0
        }
    }

    /// Insert a raw reward, evicting the oldest entry once the buffer is full.
    pub fn record(&mut self, raw_reward: f64, run_id: &str) {
        let max = self.buffer_max_size;
        let buffer = self
            .buffers
            .entry(run_id.to_string())
            .or_insert_with(|| VecDeque::with_capacity(max));
        if buffer.len() == max {
            buffer.pop_front();
        }
        buffer.push_back(raw_reward);
    }

    /// Replace the run's buffer with the newest games found in `store`.
    ///
    /// Workers in other processes only share history through the store, so
    /// this is how a fresh factory catches up. Returns the buffered count.
    pub fn seed_from_store<S: GameStore + ?Sized>(
        &mut self,
        store: &S,
        run_id: &str,
    ) -> Result<usize, StoreError> {
        let recent = store.iter_recent(run_id, self.buffer_max_size)?;
        self.buffers.remove(run_id);
        // Newest first from the store; insert oldest first.
        for record in recent.iter().rev() {
            self.record(record.reward.raw, run_id);
        }
        let len = self.buffer_len(run_id);
        log::debug!("seeded ranked reward buffer for {run_id} with {len} rewards");
        Ok(len)
    }

    /// Number of rewards currently buffered for `run_id`.
    pub fn buffer_len(&self, run_id: &str) -> usize {
        self.buffers.get(run_id).map_or(0, VecDeque::len)
    }

    /// The run's `alpha` quantile, once the buffer is large enough.
    pub fn threshold(&self, run_id: &str) -> Option<f64> {
        self.buffers
            .get(run_id)
            .filter(|b| b.len() >= self.buffer_min_size)
            .map(|b| quantile(b, self.alpha))
    }
}

/// Quantile with linear interpolation between the closest ranks.
fn quantile(values: &VecDeque<f64>, alpha: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);

    let pos = alpha * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}
