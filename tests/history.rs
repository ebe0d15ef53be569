use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use equipment_analysis::history::{HistoryStore, DEFAULT_HISTORY_WINDOW};
use equipment_analysis::types::Summary;
use equipment_analysis::AnalysisError;

fn temp_snapshot_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("equipment-analysis-{name}-{nanos}.json"))
}

fn summary(avg_pressure: f64) -> Summary {
    Summary {
        total_count: 2,
        avg_pressure,
        avg_temperature: 95.0,
        avg_flowrate: 6.0,
        type_distribution: BTreeMap::from([("Pump".to_string(), 2)]),
        row_preview: None,
    }
}

#[test]
fn recency_window_matches_store_size() {
    let store = HistoryStore::new();
    for i in 0..3 {
        store.append(&format!("f{i}.csv"), summary(i as f64)).unwrap();
    }

    for n in 0..6 {
        assert_eq!(store.recent(n).len(), n.min(3));
    }
    assert_eq!(DEFAULT_HISTORY_WINDOW, 5);
}

#[test]
fn recent_timestamps_are_non_increasing() {
    let store = HistoryStore::new();
    for i in 0..6 {
        store.append(&format!("f{i}.csv"), summary(i as f64)).unwrap();
    }

    let recent = store.recent(6);
    for pair in recent.windows(2) {
        assert!(pair[0].uploaded_at >= pair[1].uploaded_at);
    }
}

#[test]
fn snapshot_round_trip_preserves_history() {
    let path = temp_snapshot_path("roundtrip");

    {
        let store = HistoryStore::with_snapshot(&path).unwrap();
        store.append("first.csv", summary(1.0)).unwrap();
        store.append("second.csv", summary(2.0)).unwrap();
    }

    let reopened = HistoryStore::with_snapshot(&path).unwrap();
    let recent = reopened.recent(5);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].filename, "second.csv");
    assert_eq!(recent[1].filename, "first.csv");

    // Ids keep increasing across a reopen.
    let third = reopened.append("third.csv", summary(3.0)).unwrap();
    assert!(third.id > recent[0].id);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn append_clamps_timestamps_to_remain_non_decreasing() {
    let path = temp_snapshot_path("clock-step");
    {
        let store = HistoryStore::with_snapshot(&path).unwrap();
        store.append("first.csv", summary(1.0)).unwrap();
    }

    // Simulate a wall clock that stepped backwards: push the persisted record
    // far into the future, then reopen and append.
    let future = "2999-01-01T00:00:00Z";
    let mut snap: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    snap["records"][0]["uploaded_at"] = serde_json::Value::String(future.to_string());
    std::fs::write(&path, serde_json::to_vec(&snap).unwrap()).unwrap();

    let store = HistoryStore::with_snapshot(&path).unwrap();
    let appended = store.append("second.csv", summary(2.0)).unwrap();

    // The new timestamp is clamped to the future one, never before it.
    let future_ts = chrono::DateTime::parse_from_rfc3339(future).unwrap();
    assert_eq!(appended.uploaded_at, future_ts);

    let recent = store.recent(2);
    assert_eq!(recent[0].filename, "second.csv");
    assert!(recent[0].uploaded_at >= recent[1].uploaded_at);
    assert!(recent[0].id > recent[1].id);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn corrupt_snapshot_is_a_persistence_error() {
    let path = temp_snapshot_path("corrupt");
    std::fs::write(&path, b"not json at all").unwrap();

    let err = HistoryStore::with_snapshot(&path).unwrap_err();
    assert!(matches!(err, AnalysisError::Persistence { .. }));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn snapshot_write_failure_rolls_back_the_append() {
    // Point the snapshot at a path whose parent directory does not exist.
    let path = temp_snapshot_path("missing-dir").join("nested/snapshot.json");

    let store = HistoryStore::with_snapshot(&path).unwrap();
    let err = store.append("a.csv", summary(1.0)).unwrap_err();
    assert!(matches!(err, AnalysisError::Persistence { .. }));
    assert!(store.is_empty());
}
