//! Per-document progress reporting.
//!
//! The orchestrator reports each stage of a pass to a `ProgressSink`.
//! Reporting is observational only and never influences results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Pipeline stage reached by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStage {
    Queued,
    Started,
    Keywords,
    Summary,
    References,
    Features,
    Completed,
    Failed,
}

impl ProcessingStage {
    /// Completion percentage shown to users.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Started => 10,
            Self::Keywords => 40,
            Self::Summary => 60,
            Self::References => 70,
            Self::Features => 90,
            Self::Completed | Self::Failed => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Receiver of stage updates.
pub trait ProgressSink: Send + Sync {
    fn report(&self, doc_id: i64, stage: ProcessingStage, message: Option<&str>);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _doc_id: i64, _stage: ProcessingStage, _message: Option<&str>) {}
}

/// Latest update for one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub doc_id: i64,
    pub stage: ProcessingStage,
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Finished documents kept by default before the oldest is evicted.
pub const DEFAULT_FINISHED_RETENTION: usize = 1024;

/// In-memory tracker keeping the latest snapshot per document.
///
/// Documents still in flight are always kept. Once more than `retention`
/// documents have reached a terminal stage, the oldest finished snapshot is
/// evicted, so a long-running process holds a bounded map.
#[derive(Debug)]
pub struct ProgressTracker {
    inner: RwLock<HashMap<i64, ProgressSnapshot>>,
    retention: usize,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_retention(DEFAULT_FINISHED_RETENTION)
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker keeping at most `retention` finished snapshots (at least one).
    pub fn with_retention(retention: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            retention: retention.max(1),
        }
    }

    pub fn get(&self, doc_id: i64) -> Option<ProgressSnapshot> {
        self.inner.read().get(&doc_id).cloned()
    }

    /// All snapshots, ordered by document id.
    pub fn all(&self) -> Vec<ProgressSnapshot> {
        let mut snapshots: Vec<_> = self.inner.read().values().cloned().collect();
        snapshots.sort_by_key(|s| s.doc_id);
        snapshots
    }

    pub fn clear(&self, doc_id: i64) -> bool {
        self.inner.write().remove(&doc_id).is_some()
    }
}

impl ProgressSink for ProgressTracker {
    fn report(&self, doc_id: i64, stage: ProcessingStage, message: Option<&str>) {
        let snapshot = ProgressSnapshot {
            doc_id,
            stage,
            percent: stage.percent(),
            message: message.map(str::to_string),
            updated_at: Utc::now(),
        };
        let mut inner = self.inner.write();
        inner.insert(doc_id, snapshot);
        if stage.is_terminal() {
            evict_finished(&mut inner, self.retention);
        }
    }
}

/// Drop the oldest finished snapshots beyond `retention`.
fn evict_finished(snapshots: &mut HashMap<i64, ProgressSnapshot>, retention: usize) {
    let mut finished: Vec<(DateTime<Utc>, i64)> = snapshots
        .values()
        .filter(|s| s.stage.is_terminal())
        .map(|s| (s.updated_at, s.doc_id))
        .collect();
    if finished.len() <= retention {
        return;
    }
    finished.sort();
    let excess = finished.len() - retention;
    for (_, doc_id) in finished.into_iter().take(excess) {
        snapshots.remove(&doc_id);
    }
}
