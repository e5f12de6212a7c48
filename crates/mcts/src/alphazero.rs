//! AlphaZero: search guided by the problem's policy/value estimator.
//!
//! Leaves are not played out. Instead the problem is asked once per
//! expansion for the value of the vertex and a prior for each child.

use crate::{
    config::SearchConfig,
    evaluator::{Evaluation, Evaluator, LeafValue},
    search::SearchEngine,
};
use rand::Rng;
use rlsearch_core::{Priors, Problem, Result, SearchError};
use rlsearch_reward::RewardFactory;

/// Evaluator backed by [`Problem::estimate`].
///
/// When the estimator scores a padded action space
/// (`Problem::max_num_actions`), the priors of the legal children are kept
/// and renormalized. Any other length is a [`SearchError::PriorShapeMismatch`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimatorEvaluator;

impl<P: Problem> Evaluator<P> for EstimatorEvaluator {
    fn evaluate(
        &mut self,
        problem: &P,
        state: &P::State,
        children: &[P::State],
    ) -> Result<Evaluation<P::State>> {
        let estimate = problem.estimate(state, children)?;
        if !estimate.value.is_finite() {
            return Err(SearchError::NonFiniteValue(estimate.value));
        }

        let priors = Priors::align(estimate.priors, children.len(), problem.max_num_actions())?;
        Ok(Evaluation {
            priors,
            value: LeafValue::Estimate(estimate.value),
        })
    }
}

/// Search engine evaluating leaves with the problem's estimator.
pub type AlphaZeroEngine<P, R> = SearchEngine<P, EstimatorEvaluator, R>;

impl<P: Problem, R: Rng> SearchEngine<P, EstimatorEvaluator, R> {
    /// Create an engine that evaluates leaves with the problem's estimator.
    pub fn alphazero(
        problem: P,
        config: SearchConfig,
        reward_factory: RewardFactory,
        rng: R,
    ) -> Self {
        Self::new(problem, config, EstimatorEvaluator, reward_factory, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rlsearch_core::{Estimate, Info, SearchState};

    #[derive(Clone, Debug, PartialEq)]
    struct Fan(u8);

    impl SearchState for Fan {
        type Key = u8;
        type Successors = Vec<Fan>;

        fn key(&self) -> u8 {
            self.0
        }

        fn successors(&self) -> Vec<Fan> {
            if self.0 == 0 {
                vec![Fan(1), Fan(2), Fan(3)]
            } else {
                Vec::new()
            }
        }
    }

    /// Fixed estimator output, whatever the state.
    struct FanProblem {
        priors: Vec<f64>,
        value: f64,
        max_num_actions: Option<usize>,
    }

    impl Problem for FanProblem {
        type State = Fan;
        type Observation = ();

        fn initial_state(&self) -> Fan {
            Fan(0)
        }

        fn reward(&self, state: &Fan) -> (f64, Info) {
            (state.0 as f64, Info::new())
        }

        fn estimate(&self, _state: &Fan, _children: &[Fan]) -> Result<Estimate> {
            Ok(Estimate {
                value: self.value,
                priors: self.priors.clone(),
            })
        }

        fn max_num_actions(&self) -> Option<usize> {
            self.max_num_actions
        }

        fn observe(&self, _state: &Fan) {}
    }

    fn evaluate(problem: &FanProblem) -> Result<Evaluation<Fan>> {
        let state = problem.initial_state();
        let children = problem.successors(&state);
        EstimatorEvaluator.evaluate(problem, &state, &children)
    }

    #[test]
    fn test_exact_priors_renormalized() {
        let problem = FanProblem {
            priors: vec![2.0, 1.0, 1.0],
            value: 0.5,
            max_num_actions: None,
        };
        let eval = evaluate(&problem).unwrap();
        assert_eq!(eval.priors.as_slice(), &[0.5, 0.25, 0.25]);
        assert_eq!(eval.value, LeafValue::Estimate(0.5));
    }

    #[test]
    fn test_padded_priors_truncated() {
        let problem = FanProblem {
            priors: vec![0.1, 0.1, 0.2, 0.6],
            value: 0.0,
            max_num_actions: Some(4),
        };
        let eval = evaluate(&problem).unwrap();
        assert_eq!(eval.priors.len(), 3);
        assert!((eval.priors[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let problem = FanProblem {
            priors: vec![0.5, 0.5],
            value: 0.0,
            max_num_actions: Some(4),
        };
        assert!(matches!(
            evaluate(&problem),
            Err(SearchError::PriorShapeMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let problem = FanProblem {
            priors: vec![1.0, 1.0, 1.0],
            value: f64::INFINITY,
            max_num_actions: None,
        };
        assert!(matches!(
            evaluate(&problem),
            Err(SearchError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn test_engine_stores_estimator_priors() {
        let problem = FanProblem {
            priors: vec![0.2, 0.3, 0.5],
            value: 0.0,
            max_num_actions: None,
        };
        let mut engine = AlphaZeroEngine::alphazero(
            problem,
            SearchConfig::with_simulations(16),
            RewardFactory::default(),
            ChaCha8Rng::seed_from_u64(0),
        );
        let root = engine.root();
        engine.sample(root, 16).unwrap();

        let vertex = engine.cache().get(root);
        assert_eq!(vertex.priors().unwrap().as_slice(), &[0.2, 0.3, 0.5]);
        assert_eq!(vertex.value_estimate(), Some(0.0));
        assert_eq!(vertex.stats.visit_count, 16);
    }
}
