use crate::{Result, SearchState};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Free-form reward metadata reported by a problem (e.g. the final position).
pub type Info = BTreeMap<String, JsonValue>;

/// Estimator output for one vertex and its children.
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    /// Value estimate of the vertex itself.
    pub value: f64,

    /// One prior per child, in successor order. May be wider than the child
    /// list when the problem reports a padded action space.
    pub priors: Vec<f64>,
}

impl Estimate {
    /// Neutral estimate: zero value, uniform priors.
    pub fn uniform(num_children: usize) -> Self {
        let prior = if num_children == 0 {
            0.0
        } else {
            1.0 / num_children as f64
        };
        Self {
            value: 0.0,
            priors: vec![prior; num_children],
        }
    }
}

/// A search problem: the boundary between the engines and a domain.
///
/// The problem owns rewards, the policy/value estimator and observation
/// encodings. Successor generation belongs to the state.
pub trait Problem {
    /// The search state type.
    type State: SearchState;

    /// The observation format for the estimator.
    type Observation;

    /// Returns the state every game starts from.
    fn initial_state(&self) -> Self::State;

    /// Returns the successors of `state` in their canonical order.
    fn successors(&self, state: &Self::State) -> Vec<Self::State> {
        state.successors().into_iter().collect()
    }

    /// Returns true if the problem considers `state` final.
    ///
    /// States without successors are terminal whatever this returns.
    fn is_terminal(&self, _state: &Self::State) -> bool {
        false
    }

    /// Raw reward and metadata for `state`.
    ///
    /// Only meaningful for terminal states; other states should return the
    /// problem's default. Failures to build the domain object behind a state
    /// are expected to be handled here by returning a sentinel reward.
    fn reward(&self, state: &Self::State) -> (f64, Info);

    /// Batched estimator call: value of `state` and one prior per child.
    fn estimate(&self, _state: &Self::State, children: &[Self::State]) -> Result<Estimate> {
        Ok(Estimate::uniform(children.len()))
    }

    /// Width of the estimator's padded action space, if it has one.
    fn max_num_actions(&self) -> Option<usize> {
        None
    }

    /// Result reported to gym-style wrappers for an out-of-range action index:
    /// `(reward, terminal, info)`.
    fn invalid_action_result(&self) -> (f64, bool, Info) {
        let mut info = Info::new();
        info.insert("invalid_action".to_string(), JsonValue::Bool(true));
        (0.0, true, info)
    }

    /// Converts a state to the estimator's observation format.
    fn observe(&self, state: &Self::State) -> Self::Observation;
}
