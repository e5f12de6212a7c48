//! Game store implementations.
//!
//! Both stores implement [`rlsearch_core::GameStore`]:
//!
//! - [`MemoryGameStore`] - in-process, for tests and single-process drivers
//! - [`FileGameStore`] - append-only NDJSON file shared by worker processes

mod file;
mod memory;

pub use file::FileGameStore;
pub use memory::MemoryGameStore;

use rlsearch_core::GameRecord;

/// Newest-first view of `records` for one run (stable for equal timestamps:
/// later appends come first).
pub(crate) fn newest_first<'a, I>(records: I, run_id: &str, limit: usize) -> Vec<GameRecord>
where
    I: DoubleEndedIterator<Item = &'a GameRecord>,
{
    let mut matching: Vec<GameRecord> = records
        .rev()
        .filter(|r| r.run_id == run_id)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    matching.truncate(limit);
    matching
}

/// Highest raw reward among the run's records; the earliest wins ties.
pub(crate) fn best_of<'a, I>(records: I, run_id: &str) -> Option<GameRecord>
where
    I: Iterator<Item = &'a GameRecord>,
{
    let mut best: Option<&GameRecord> = None;
    for record in records.filter(|r| r.run_id == run_id) {
        if best.map_or(true, |b| record.reward.raw > b.reward.raw) {
            best = Some(record);
        }
    }
    best.cloned()
}
