use crate::{GameRecord, StoreError};

/// Append-only store of finished games, shared by self-play workers and the
/// trainer.
///
/// Workers only append; the trainer only reads. Implementations may be
/// eventually durable, but `append` must not return `Ok` before the record is
/// accepted: callers treat a successful return as "recorded".
pub trait GameStore {
    /// Persist one finished game.
    fn append(&self, record: &GameRecord) -> Result<(), StoreError>;

    /// Up to `limit` games of `run_id`, newest first by timestamp.
    fn iter_recent(&self, run_id: &str, limit: usize) -> Result<Vec<GameRecord>, StoreError>;

    /// The game of `run_id` with the highest raw reward, if any.
    fn best_reward(&self, run_id: &str) -> Result<Option<GameRecord>, StoreError>;
}

impl<S: GameStore + ?Sized> GameStore for &S {
    fn append(&self, record: &GameRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn iter_recent(&self, run_id: &str, limit: usize) -> Result<Vec<GameRecord>, StoreError> {
        (**self).iter_recent(run_id, limit)
    }

    fn best_reward(&self, run_id: &str) -> Result<Option<GameRecord>, StoreError> {
        (**self).best_reward(run_id)
    }
}
