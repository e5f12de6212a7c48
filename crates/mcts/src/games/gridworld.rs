//! Square grid navigation from the top-left to the bottom-right corner.
//!
//! Moves go right, down, left or up, never off the grid or into a wall. The
//! episode ends at the goal or after `2 * size + 2` moves. The reward is the
//! negated number of moves, or `-2 * max_steps` when the goal is not reached.
//!
//! Unlike the hallway, the grid ships its own estimator: a Manhattan
//! distance heuristic, which makes it a cheap stand-in for a trained model.

use rlsearch_core::{Estimate, Info, Problem, Result, SearchState};
use rustc_hash::FxHashSet;
use serde_json::json;
use std::sync::Arc;

/// Offsets in successor order: right, down, left, up.
const MOVES: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

#[derive(Clone, Debug)]
pub struct GridState {
    x: usize,
    y: usize,
    steps: usize,
    grid: Arc<Layout>,
}

#[derive(Debug)]
struct Layout {
    size: usize,
    max_steps: usize,
    walls: FxHashSet<(usize, usize)>,
}

impl GridState {
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn at_goal(&self) -> bool {
        let last = self.grid.size - 1;
        self.x == last && self.y == last
    }

    pub fn is_final(&self) -> bool {
        self.at_goal() || self.steps >= self.grid.max_steps
    }

    /// Manhattan distance to the goal.
    pub fn distance(&self) -> usize {
        let last = self.grid.size - 1;
        (last - self.x) + (last - self.y)
    }
}

impl SearchState for GridState {
    type Key = String;
    type Successors = Vec<GridState>;

    fn key(&self) -> String {
        format!("{},{}@{}", self.x, self.y, self.steps)
    }

    fn successors(&self) -> Vec<GridState> {
        if self.is_final() {
            return Vec::new();
        }

        let size = self.grid.size as isize;
        MOVES
            .iter()
            .filter_map(|&(dx, dy)| {
                let x = self.x as isize + dx;
                let y = self.y as isize + dy;
                if x < 0 || y < 0 || x >= size || y >= size {
                    return None;
                }
                let (x, y) = (x as usize, y as usize);
                if self.grid.walls.contains(&(x, y)) {
                    return None;
                }
                Some(GridState {
                    x,
                    y,
                    steps: self.steps + 1,
                    grid: Arc::clone(&self.grid),
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct GridWorld {
    grid: Arc<Layout>,
}

impl GridWorld {
    /// An empty `size` x `size` grid.
    ///
    /// # Panics
    /// Panics if `size < 2`.
    pub fn new(size: usize) -> Self {
        Self::with_walls(size, std::iter::empty())
    }

    /// A grid with blocked cells. Walls on the start or goal cell are ignored.
    pub fn with_walls(size: usize, walls: impl IntoIterator<Item = (usize, usize)>) -> Self {
        assert!(size >= 2, "grid needs at least 2x2 cells");
        let last = size - 1;
        let walls = walls
            .into_iter()
            .filter(|&cell| cell != (0, 0) && cell != (last, last))
            .collect();

        Self {
            grid: Arc::new(Layout {
                size,
                max_steps: 2 * size + 2,
                walls,
            }),
        }
    }

    pub fn size(&self) -> usize {
        self.grid.size
    }

    pub fn max_steps(&self) -> usize {
        self.grid.max_steps
    }

    /// Raw reward range: `(failure penalty, optimal reward)`.
    pub fn reward_bounds(&self) -> (f64, f64) {
        (
            -2.0 * self.grid.max_steps as f64,
            -2.0 * (self.grid.size - 1) as f64,
        )
    }
}

impl Problem for GridWorld {
    type State = GridState;
    type Observation = Vec<f32>;

    fn initial_state(&self) -> GridState {
        GridState {
            x: 0,
            y: 0,
            steps: 0,
            grid: Arc::clone(&self.grid),
        }
    }

    fn is_terminal(&self, state: &GridState) -> bool {
        state.is_final()
    }

    fn reward(&self, state: &GridState) -> (f64, Info) {
        let raw = if state.at_goal() {
            -(state.steps as f64)
        } else {
            -2.0 * self.grid.max_steps as f64
        };

        let mut info = Info::new();
        info.insert("position".to_string(), json!([state.x, state.y]));
        info.insert("steps".to_string(), json!(state.steps));
        (raw, info)
    }

    /// Value: fraction of the diagonal already covered. Priors: moves that
    /// get closer to the goal weigh twice as much as the others.
    fn estimate(&self, state: &GridState, children: &[GridState]) -> Result<Estimate> {
        let diagonal = (2 * (self.grid.size - 1)) as f64;
        let value = 1.0 - state.distance() as f64 / diagonal;
        let priors = children
            .iter()
            .map(|c| if c.distance() < state.distance() { 2.0 } else { 1.0 })
            .collect();

        Ok(Estimate { value, priors })
    }

    /// Normalized coordinates and elapsed steps.
    fn observe(&self, state: &GridState) -> Vec<f32> {
        let last = (self.grid.size - 1) as f32;
        vec![
            state.x as f32 / last,
            state.y as f32 / last,
            state.steps as f32 / self.grid.max_steps as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_successors() {
        let world = GridWorld::new(3);
        let start = world.initial_state();
        let next: Vec<_> = world
            .successors(&start)
            .iter()
            .map(|s| s.position())
            .collect();

        // Right and down only.
        assert_eq!(next, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_walls_block_moves() {
        let world = GridWorld::with_walls(3, [(1, 0), (0, 0)]);
        let start = world.initial_state();
        let next: Vec<_> = world
            .successors(&start)
            .iter()
            .map(|s| s.position())
            .collect();
        assert_eq!(next, vec![(0, 1)]);
    }

    #[test]
    fn test_estimate_prefers_progress() {
        let world = GridWorld::new(4);
        let start = world.initial_state();
        let children = world.successors(&start);
        let estimate = world.estimate(&start, &children).unwrap();

        assert_eq!(estimate.value, 0.0);
        assert_eq!(estimate.priors, vec![2.0, 2.0]);
    }

    #[test]
    fn test_goal_reward() {
        let world = GridWorld::new(2);
        let mut state = world.initial_state();
        // Right, then down.
        state = world.successors(&state).remove(0);
        state = world.successors(&state).remove(0);
        assert!(state.at_goal());
        assert!(world.is_terminal(&state));
        assert_eq!(world.reward(&state).0, -2.0);
        assert_eq!(state.key(), "1,1@2");
    }

    #[test]
    fn test_step_limit() {
        let world = GridWorld::new(2);
        assert_eq!(world.max_steps(), 6);
        assert_eq!(world.reward_bounds(), (-12.0, -2.0));
    }
}
