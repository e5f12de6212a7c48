//! Evaluation abstraction for the search engines.
//!
//! The `Evaluator` trait allows swapping between evaluation strategies:
//! - `RolloutEvaluator`: uniform priors, random playout to a terminal state
//! - `EstimatorEvaluator`: the problem's batched policy/value estimator

use rand::Rng;
use rlsearch_core::{Priors, Problem, Result};

/// Value of a freshly expanded leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum LeafValue<S> {
    /// A value estimate, already on the scale of the scaled reward.
    Estimate(f64),

    /// The state a playout ended in. The engine scores it through the
    /// problem's reward and the reward factory.
    Rollout(S),
}

/// Evaluation result: priors over the children plus a leaf value.
#[derive(Clone, Debug)]
pub struct Evaluation<S> {
    /// One prior per child, in successor order.
    pub priors: Priors,

    pub value: LeafValue<S>,
}

/// Trait for evaluating a vertex that is being expanded.
pub trait Evaluator<P: Problem> {
    /// Evaluate `state`, whose successors are `children`.
    ///
    /// `children` is never empty: states without successors are terminal and
    /// are scored by the engine directly.
    fn evaluate(
        &mut self,
        problem: &P,
        state: &P::State,
        children: &[P::State],
    ) -> Result<Evaluation<P::State>>;
}

/// Evaluator using uniform priors and random rollouts.
///
/// This is the simplest evaluation strategy:
/// - Priors: uniform distribution over the children
/// - Value: reward of the state a random playout ends in
pub struct RolloutEvaluator<R: Rng> {
    rng: R,

    /// Maximum depth for random rollouts.
    max_rollout_depth: usize,
}

impl<R: Rng> RolloutEvaluator<R> {
    /// Create a new rollout evaluator.
    ///
    /// # Arguments
    /// * `rng` - Random number generator for rollouts
    /// * `max_rollout_depth` - Maximum moves in a random playout
    pub fn new(rng: R, max_rollout_depth: usize) -> Self {
        Self {
            rng,
            max_rollout_depth,
        }
    }

    /// Play uniformly random moves from one of `children` until a terminal
    /// state or the depth limit.
    fn rollout<P: Problem>(&mut self, problem: &P, children: &[P::State]) -> P::State {
        let mut state = children[self.rng.gen_range(0..children.len())].clone();
        let mut depth = 1;

        while depth < self.max_rollout_depth && !problem.is_terminal(&state) {
            let successors = problem.successors(&state);
            if successors.is_empty() {
                break;
            }

            let idx = self.rng.gen_range(0..successors.len());
            state = successors[idx].clone();
            depth += 1;
        }

        state
    }
}

impl<P: Problem, R: Rng> Evaluator<P> for RolloutEvaluator<R> {
    fn evaluate(
        &mut self,
        problem: &P,
        _state: &P::State,
        children: &[P::State],
    ) -> Result<Evaluation<P::State>> {
        let priors = Priors::uniform(children.len())?;
        let end = self.rollout(problem, children);

        Ok(Evaluation {
            priors,
            value: LeafValue::Rollout(end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rlsearch_core::{Info, SearchState};

    // Count up by 1 or 2; anything at or past 5 is final.
    #[derive(Clone, Debug, PartialEq)]
    struct Count(u8);

    impl SearchState for Count {
        type Key = u8;
        type Successors = Vec<Count>;

        fn key(&self) -> u8 {
            self.0
        }

        fn successors(&self) -> Vec<Count> {
            if self.0 >= 5 {
                Vec::new()
            } else {
                vec![Count(self.0 + 1), Count(self.0 + 2)]
            }
        }
    }

    struct CountProblem;

    impl Problem for CountProblem {
        type State = Count;
        type Observation = ();

        fn initial_state(&self) -> Count {
            Count(0)
        }

        fn reward(&self, state: &Count) -> (f64, Info) {
            (state.0 as f64, Info::new())
        }

        fn observe(&self, _state: &Count) {}
    }

    #[test]
    fn test_rollout_evaluator_priors() {
        let mut evaluator = RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(42), 10);
        let problem = CountProblem;
        let state = problem.initial_state();
        let children = problem.successors(&state);

        let eval = evaluator.evaluate(&problem, &state, &children).unwrap();

        // Priors should be uniform over 2 children
        assert_eq!(eval.priors.len(), 2);
        assert!((eval.priors[0] - 0.5).abs() < 1e-12);
        assert!((eval.priors[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rollout_reaches_terminal() {
        let mut evaluator = RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(7), 100);
        let problem = CountProblem;
        let state = problem.initial_state();
        let children = problem.successors(&state);

        for _ in 0..20 {
            let eval = evaluator.evaluate(&problem, &state, &children).unwrap();
            match eval.value {
                LeafValue::Rollout(end) => assert!(end.0 >= 5),
                LeafValue::Estimate(_) => panic!("rollouts never produce estimates"),
            }
        }
    }

    #[test]
    fn test_rollout_depth_limit() {
        let mut evaluator = RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(7), 1);
        let problem = CountProblem;
        let state = problem.initial_state();
        let children = problem.successors(&state);

        let eval = evaluator.evaluate(&problem, &state, &children).unwrap();
        // Depth 1 stops at one of the children.
        match eval.value {
            LeafValue::Rollout(end) => assert!(children.contains(&end)),
            LeafValue::Estimate(_) => panic!("rollouts never produce estimates"),
        }
    }
}
