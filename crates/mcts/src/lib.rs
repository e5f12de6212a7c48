//! rlsearch MCTS - tree search over hash-consed state DAGs
//!
//! This crate provides Monte Carlo Tree Search with PUCT selection, and an
//! AlphaZero variant that evaluates leaves with the problem's estimator.
//! States reached through different action sequences share one vertex.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rlsearch_mcts::games::Hallway;
//! use rlsearch_mcts::{AlphaZeroEngine, SearchConfig};
//! use rlsearch_reward::{LinearBoundedRewardFactory, RewardFactory};
//!
//! let hallway = Hallway::new(4, 10);
//! let (min, max) = hallway.reward_bounds();
//! let reward = RewardFactory::from(LinearBoundedRewardFactory::new(min, max).unwrap());
//!
//! let mut engine = AlphaZeroEngine::alphazero(
//!     hallway,
//!     SearchConfig::for_evaluation(200),
//!     reward,
//!     ChaCha8Rng::seed_from_u64(42),
//! );
//! let game = engine.run().unwrap();
//! assert!(game.final_state.at_goal());
//! ```

pub mod alphazero;
pub mod cache;
pub mod config;
pub mod evaluator;
pub mod games;
pub mod search;
pub mod selfplay;
pub mod timing;
pub mod vertex;

pub use alphazero::{AlphaZeroEngine, EstimatorEvaluator};
pub use cache::VertexCache;
pub use config::SearchConfig;
pub use evaluator::{Evaluation, Evaluator, LeafValue, RolloutEvaluator};
pub use search::{Game, MctsEngine, SearchEngine, Step};
pub use selfplay::SelfPlayWorker;
pub use timing::{Phase, SearchTimings};
pub use vertex::{Vertex, VertexId, VertexStats};
