//! Append-only NDJSON game store.
//!
//! One JSON object per line, one line per finished game. Several worker
//! processes may append to the same file: each record is written with a
//! single `write_all` on an `O_APPEND` handle and synced before `append`
//! returns. Readers skip a torn line; a writer that finds one at the end of
//! the file terminates it first so the torn bytes never swallow its record.

use crate::{best_of, newest_first};
use rlsearch_core::{GameRecord, GameStore, StoreError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct FileGameStore {
    path: PathBuf,
    // Serializes appends from threads sharing this handle.
    write_lock: Mutex<()>,
}

impl FileGameStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<GameRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GameRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    log::warn!(
                        "skipping unreadable record at {}:{}: {e}",
                        self.path.display(),
                        lineno + 1
                    );
                }
            }
        }
        Ok(records)
    }
}

/// Whether the file's last byte leaves a partial line behind.
fn ends_mid_line(file: &mut File) -> Result<bool, StoreError> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl GameStore for FileGameStore {
    fn append(&self, record: &GameRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut line = String::with_capacity(json.len() + 2);
        if ends_mid_line(&mut file)? {
            log::warn!("terminating torn line at end of {}", self.path.display());
            line.push('\n');
        }
        line.push_str(&json);
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        log::debug!(
            "appended game {} ({} steps) to {}",
            record.game_id,
            record.len(),
            self.path.display()
        );
        Ok(())
    }

    fn iter_recent(&self, run_id: &str, limit: usize) -> Result<Vec<GameRecord>, StoreError> {
        let records = self.read_all()?;
        Ok(newest_first(records.iter(), run_id, limit))
    }

    fn best_reward(&self, run_id: &str) -> Result<Option<GameRecord>, StoreError> {
        let records = self.read_all()?;
        Ok(best_of(records.iter(), run_id))
    }
}
