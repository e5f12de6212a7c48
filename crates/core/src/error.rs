use thiserror::Error;

/// Errors raised by the search engines.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("estimator returned {got} priors for {expected} children")]
    PriorShapeMismatch { expected: usize, got: usize },

    #[error("invalid priors: {0}")]
    InvalidPriors(String),

    #[error("reward is not finite: {0}")]
    NonFiniteReward(f64),

    #[error("value estimate is not finite: {0}")]
    NonFiniteValue(f64),

    #[error("game store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by [`GameStore`](crate::GameStore) implementations.
///
/// All of these are recoverable from the point of view of a self-play
/// worker: the search itself never touches the store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
