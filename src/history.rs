//! Recency-ordered persistence of [`SummaryRecord`]s.
//!
//! [`HistoryStore`] owns the persisted collection. Appends are serialized
//! against concurrent reads through an interior mutex, so a reader never
//! observes a partially written record. An optional JSON snapshot file makes
//! the history survive process restarts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{RecordId, Summary, SummaryRecord};

/// Number of records returned by a history query when no count is given.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

#[derive(Debug)]
struct Inner {
    /// Records in append order. Append keeps ids strictly increasing and
    /// timestamps non-decreasing, so reverse iteration is recency order.
    records: Vec<SummaryRecord>,
    next_id: u64,
}

/// On-disk snapshot shape.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    records: Vec<SummaryRecord>,
}

/// Store of past analyses, most recent last in insertion order.
#[derive(Debug)]
pub struct HistoryStore {
    inner: Mutex<Inner>,
    snapshot: Option<PathBuf>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: Vec::new(),
                next_id: 1,
            }),
            snapshot: None,
        }
    }

    /// Open a store backed by a JSON snapshot file.
    ///
    /// If the file exists it is loaded; otherwise the store starts empty and
    /// the file is created on first append. An unreadable or corrupt snapshot
    /// fails with [`AnalysisError::Persistence`].
    pub fn with_snapshot(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| AnalysisError::Persistence {
                message: format!("failed to read snapshot {}: {e}", path.display()),
            })?;
            let snap: Snapshot =
                serde_json::from_slice(&bytes).map_err(|e| AnalysisError::Persistence {
                    message: format!("failed to parse snapshot {}: {e}", path.display()),
                })?;
            Inner {
                next_id: snap.next_id,
                records: snap.records,
            }
        } else {
            Inner {
                records: Vec::new(),
                next_id: 1,
            }
        };

        Ok(Self {
            inner: Mutex::new(inner),
            snapshot: Some(path),
        })
    }

    /// Append a new record built from `summary` plus caller context.
    ///
    /// Assigns the next strictly increasing id and the current timestamp
    /// (clamped so timestamps never decrease across records, even if the wall
    /// clock steps back), then returns the persisted record with both attached.
    /// With a snapshot configured, the snapshot write happens inside the same
    /// critical section; on write failure the in-memory insert is rolled back
    /// and [`AnalysisError::Persistence`] is returned.
    pub fn append(&self, filename: &str, summary: Summary) -> AnalysisResult<SummaryRecord> {
        let mut inner = self.lock();

        let mut uploaded_at = Utc::now();
        if let Some(last) = inner.records.last() {
            if uploaded_at < last.uploaded_at {
                uploaded_at = last.uploaded_at;
            }
        }

        let record = SummaryRecord {
            id: RecordId(inner.next_id),
            filename: filename.to_owned(),
            uploaded_at,
            summary,
        };
        inner.records.push(record.clone());

        if let Some(path) = self.snapshot.as_ref() {
            if let Err(e) = write_snapshot(path, inner.next_id + 1, &inner.records) {
                inner.records.pop();
                return Err(e);
            }
        }

        inner.next_id += 1;
        Ok(record)
    }

    /// The most recent `n` records, newest first.
    ///
    /// Ordered by `uploaded_at` descending, ties broken by id descending.
    /// Returns fewer than `n` when fewer exist; an empty store yields an empty
    /// vec, not an error.
    pub fn recent(&self, n: usize) -> Vec<SummaryRecord> {
        let inner = self.lock();
        inner.records.iter().rev().take(n).cloned().collect()
    }

    /// The single most recent record.
    pub fn latest(&self) -> AnalysisResult<SummaryRecord> {
        let inner = self.lock();
        inner.records.last().cloned().ok_or(AnalysisError::NotFound)
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock still guards consistent data: append either completes
        // or rolls back before any panic could occur.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_snapshot(path: &Path, next_id: u64, records: &[SummaryRecord]) -> AnalysisResult<()> {
    let snap = Snapshot {
        next_id,
        records: records.to_vec(),
    };
    let bytes = serde_json::to_vec_pretty(&snap).map_err(|e| AnalysisError::Persistence {
        message: format!("failed to serialize snapshot: {e}"),
    })?;
    fs::write(path, bytes).map_err(|e| AnalysisError::Persistence {
        message: format!("failed to write snapshot {}: {e}", path.display()),
    })
}
