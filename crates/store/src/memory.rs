use crate::{best_of, newest_first};
use rlsearch_core::{GameRecord, GameStore, StoreError};
use std::sync::{Mutex, MutexGuard};

/// In-memory game store. Cheap to share between threads by reference.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    records: Mutex<Vec<GameRecord>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of games across all runs.
    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |r| r.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<GameRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl GameStore for MemoryGameStore {
    fn append(&self, record: &GameRecord) -> Result<(), StoreError> {
        self.guard()?.push(record.clone());
        Ok(())
    }

    fn iter_recent(&self, run_id: &str, limit: usize) -> Result<Vec<GameRecord>, StoreError> {
        Ok(newest_first(self.guard()?.iter(), run_id, limit))
    }

    fn best_reward(&self, run_id: &str) -> Result<Option<GameRecord>, StoreError> {
        Ok(best_of(self.guard()?.iter(), run_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlsearch_core::{Info, Reward};

    fn record(run_id: &str, game_id: &str, raw: f64, timestamp_ms: u64) -> GameRecord {
        GameRecord {
            run_id: run_id.to_string(),
            game_id: game_id.to_string(),
            steps: Vec::new(),
            final_state_key: String::new(),
            reward: Reward::new(raw, 0.0, Info::new()),
            timestamp_ms,
        }
    }

    #[test]
    fn test_recent_is_newest_first() {
        let store = MemoryGameStore::new();
        store.append(&record("a", "1", 0.0, 10)).unwrap();
        store.append(&record("a", "2", 0.0, 30)).unwrap();
        store.append(&record("b", "3", 0.0, 40)).unwrap();
        store.append(&record("a", "4", 0.0, 20)).unwrap();

        let ids: Vec<String> = store
            .iter_recent("a", 10)
            .unwrap()
            .into_iter()
            .map(|r| r.game_id)
            .collect();
        assert_eq!(ids, vec!["2", "4", "1"]);
        assert_eq!(store.iter_recent("a", 1).unwrap().len(), 1);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_equal_timestamps_prefer_later_appends() {
        let store = MemoryGameStore::new();
        store.append(&record("a", "first", 0.0, 10)).unwrap();
        store.append(&record("a", "second", 0.0, 10)).unwrap();
        assert_eq!(store.iter_recent("a", 1).unwrap()[0].game_id, "second");
    }

    #[test]
    fn test_best_reward() {
        let store = MemoryGameStore::new();
        assert!(store.best_reward("a").unwrap().is_none());
        store.append(&record("a", "1", -3.0, 10)).unwrap();
        store.append(&record("a", "2", -1.0, 20)).unwrap();
        store.append(&record("b", "3", 5.0, 30)).unwrap();
        assert_eq!(store.best_reward("a").unwrap().unwrap().game_id, "2");
    }
}
