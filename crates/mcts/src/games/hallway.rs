//! One-dimensional hallway.
//!
//! The walker starts at position 0 and must reach position `length - 1`.
//! Each step moves one cell back or forward. The episode ends at the goal or
//! after `max_steps` moves; the reward is the negated number of steps taken,
//! with a flat penalty of `2 * max_steps` for not arriving.

use rlsearch_core::{Info, Problem, SearchState};
use serde_json::json;
use std::fmt;

/// Canonical key: position and step count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HallwayKey {
    pub position: usize,
    pub steps: usize,
}

impl fmt::Display for HallwayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.position, self.steps)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HallwayState {
    position: usize,
    steps: usize,
    length: usize,
    max_steps: usize,
}

impl HallwayState {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn at_goal(&self) -> bool {
        self.position + 1 >= self.length
    }

    pub fn is_final(&self) -> bool {
        self.at_goal() || self.steps >= self.max_steps
    }

    fn moved_to(&self, position: usize) -> Self {
        Self {
            position,
            steps: self.steps + 1,
            ..self.clone()
        }
    }
}

impl SearchState for HallwayState {
    type Key = HallwayKey;
    type Successors = Vec<HallwayState>;

    fn key(&self) -> HallwayKey {
        HallwayKey {
            position: self.position,
            steps: self.steps,
        }
    }

    /// Back (when not at the start), then forward.
    fn successors(&self) -> Vec<HallwayState> {
        if self.is_final() {
            return Vec::new();
        }

        let mut next = Vec::with_capacity(2);
        if self.position > 0 {
            next.push(self.moved_to(self.position - 1));
        }
        next.push(self.moved_to(self.position + 1));
        next
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hallway {
    length: usize,
    max_steps: usize,
}

impl Hallway {
    /// # Panics
    /// Panics if `length < 2`.
    pub fn new(length: usize, max_steps: usize) -> Self {
        assert!(length >= 2, "hallway needs at least two cells");
        Self { length, max_steps }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Raw reward range: `(failure penalty, optimal reward)`.
    pub fn reward_bounds(&self) -> (f64, f64) {
        (-2.0 * self.max_steps as f64, -((self.length - 1) as f64))
    }
}

impl Problem for Hallway {
    type State = HallwayState;
    type Observation = Vec<f32>;

    fn initial_state(&self) -> HallwayState {
        HallwayState {
            position: 0,
            steps: 0,
            length: self.length,
            max_steps: self.max_steps,
        }
    }

    fn is_terminal(&self, state: &HallwayState) -> bool {
        state.is_final()
    }

    fn reward(&self, state: &HallwayState) -> (f64, Info) {
        let raw = if state.at_goal() {
            -(state.steps as f64)
        } else {
            -2.0 * self.max_steps as f64
        };

        let mut info = Info::new();
        info.insert("position".to_string(), json!(state.position));
        info.insert("steps".to_string(), json!(state.steps));
        (raw, info)
    }

    /// Normalized position and elapsed steps.
    fn observe(&self, state: &HallwayState) -> Vec<f32> {
        vec![
            state.position as f32 / (self.length - 1) as f32,
            state.steps as f32 / self.max_steps.max(1) as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_successors() {
        let hallway = Hallway::new(4, 10);
        let start = hallway.initial_state();
        let next = hallway.successors(&start);

        // Only forward from the start.
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].position(), 1);
        assert_eq!(next[0].steps(), 1);

        let both = hallway.successors(&next[0]);
        assert_eq!(
            both.iter().map(|s| s.position()).collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn test_goal_is_terminal() {
        let hallway = Hallway::new(3, 10);
        let mut state = hallway.initial_state();
        for _ in 0..2 {
            state = hallway.successors(&state).pop().unwrap();
        }
        assert!(state.at_goal());
        assert!(hallway.is_terminal(&state));
        assert!(state.successors().is_empty());

        let (reward, info) = hallway.reward(&state);
        assert_eq!(reward, -2.0);
        assert_eq!(info["steps"], json!(2));
    }

    #[test]
    fn test_step_limit_penalty() {
        let hallway = Hallway::new(10, 2);
        let mut state = hallway.initial_state();
        for _ in 0..2 {
            state = hallway.successors(&state).remove(0);
        }
        assert!(hallway.is_terminal(&state));
        assert_eq!(hallway.reward(&state).0, -4.0);
    }

    #[test]
    fn test_key_display() {
        let key = HallwayKey {
            position: 2,
            steps: 5,
        };
        assert_eq!(key.to_string(), "2@5");
    }

    #[test]
    fn test_reward_bounds() {
        assert_eq!(Hallway::new(16, 16).reward_bounds(), (-32.0, -15.0));
    }
}
