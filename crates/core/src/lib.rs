//! rlsearch core - search-space abstractions and shared types
//!
//! This crate provides the contracts that a domain must implement to be
//! searched by the engines in `rlsearch_mcts`, together with the records
//! that flow between self-play workers and the training loop.
//!
//! # Types
//!
//! - [`SearchState`] - Canonical, immutable state with ordered successors
//! - [`Problem`] - Rewards, estimator output and observations for a domain
//! - [`Priors`] - Probability distribution over a vertex's children (sums to 1.0)
//! - [`GameRecord`] - One finished game, as appended to a [`GameStore`]

mod error;
mod problem;
mod record;
mod state;
mod store;
mod types;

pub use error::{Result, SearchError, StoreError};
pub use problem::{Estimate, Info, Problem};
pub use record::{now_ms, GameRecord, GameStep, StepRow};
pub use state::SearchState;
pub use store::GameStore;
pub use types::{Priors, Reward, PRIOR_SUM_TOLERANCE};
