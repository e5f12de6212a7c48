//! Finished-game records exchanged between self-play workers and the trainer.

use crate::Reward;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

/// One decision of a played game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStep {
    pub step_index: usize,

    /// Canonical key of the state the decision was made from.
    pub state_key: String,

    /// Index of the chosen child in successor order.
    pub action_index: usize,

    /// Normalized root visit counts, one entry per child (the policy target).
    pub visit_distribution: Vec<f64>,
}

/// A finished self-play game. Immutable once appended to a store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub run_id: String,
    pub game_id: String,
    pub steps: Vec<GameStep>,
    pub final_state_key: String,
    pub reward: Reward,
    pub timestamp_ms: u64,
}

/// Flattened per-step row of a game record: the logical shape persisted by
/// table-oriented stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    pub run_id: String,
    pub game_id: String,
    pub step_index: usize,
    pub state_key: String,
    pub action_index: usize,
    pub visit_distribution: Vec<f64>,
    pub reward: f64,
    pub timestamp_ms: u64,
}

impl GameRecord {
    /// Number of decisions in the game.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for games whose initial state was already terminal.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Flatten into per-step rows, in step order. Every row carries the raw
    /// terminal reward.
    pub fn rows(&self) -> Vec<StepRow> {
        self.steps
            .iter()
            .map(|step| StepRow {
                run_id: self.run_id.clone(),
                game_id: self.game_id.clone(),
                step_index: step.step_index,
                state_key: step.state_key.clone(),
                action_index: step.action_index,
                visit_distribution: step.visit_distribution.clone(),
                reward: self.reward.raw,
                timestamp_ms: self.timestamp_ms,
            })
            .collect()
    }
}
