use rlsearch_core::{GameRecord, GameStep, GameStore, Info, Reward, StoreError};
use rlsearch_store::FileGameStore;
use std::fs::OpenOptions;
use std::io::Write;

fn record(run_id: &str, game_id: &str, raw: f64, timestamp_ms: u64) -> GameRecord {
    let mut info = Info::new();
    info.insert("position".to_string(), serde_json::json!(3));
    GameRecord {
        run_id: run_id.to_string(),
        game_id: game_id.to_string(),
        steps: vec![GameStep {
            step_index: 0,
            state_key: "0@0".to_string(),
            action_index: 0,
            visit_distribution: vec![1.0],
        }],
        final_state_key: "3@3".to_string(),
        reward: Reward::new(raw, 1.0, info),
        timestamp_ms,
    }
}

#[test]
fn test_append_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileGameStore::open(dir.path().join("games/hallway.ndjson")).unwrap();

    let original = record("hallway", "g1", -3.0, 100);
    store.append(&original).unwrap();

    let recent = store.iter_recent("hallway", 10).unwrap();
    assert_eq!(recent, vec![original]);
}

#[test]
fn test_reopen_sees_previous_games() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.ndjson");
    {
        let store = FileGameStore::open(&path).unwrap();
        store.append(&record("run", "g1", -5.0, 100)).unwrap();
        store.append(&record("run", "g2", -3.0, 200)).unwrap();
    }

    let store = FileGameStore::open(&path).unwrap();
    let ids: Vec<String> = store
        .iter_recent("run", 10)
        .unwrap()
        .into_iter()
        .map(|r| r.game_id)
        .collect();
    assert_eq!(ids, vec!["g2", "g1"]);
    assert_eq!(store.best_reward("run").unwrap().unwrap().game_id, "g2");
    assert!(store.best_reward("missing").unwrap().is_none());
}

#[test]
fn test_torn_line_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.ndjson");
    let store = FileGameStore::open(&path).unwrap();
    store.append(&record("run", "g1", -5.0, 100)).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"{\"run_id\": \"run\", \"game_").unwrap();

    assert_eq!(store.iter_recent("run", 10).unwrap().len(), 1);
}

#[test]
fn test_append_after_torn_line_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.ndjson");
    let store = FileGameStore::open(&path).unwrap();
    store.append(&record("run", "g1", -5.0, 100)).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"{\"run_id\": \"run\", \"ga").unwrap();
    drop(file);

    store.append(&record("run", "g2", -3.0, 200)).unwrap();
    store.append(&record("run", "g3", -4.0, 300)).unwrap();

    let ids: Vec<String> = store
        .iter_recent("run", 10)
        .unwrap()
        .into_iter()
        .map(|r| r.game_id)
        .collect();
    assert_eq!(ids, vec!["g3", "g2", "g1"]);
}

#[test]
fn test_unwritable_location_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let result = FileGameStore::open(blocker.join("games.ndjson"));
    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[test]
fn test_threads_share_one_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileGameStore::open(dir.path().join("games.ndjson")).unwrap();

    std::thread::scope(|s| {
        for worker in 0..4 {
            let store = &store;
            s.spawn(move || {
                for i in 0..10 {
                    let id = format!("w{worker}-{i}");
                    store.append(&record("run", &id, i as f64, i)).unwrap();
                }
            });
        }
    });

    assert_eq!(store.iter_recent("run", 100).unwrap().len(), 40);
}
