//! Orphaned Upload Sweeper
//!
//! Reconciles the file store against the authoritative attachment record.
//! Uploads commit their file before (or independently of) the record, so a
//! file without a record is either abandoned or still mid-upload; only files
//! older than a safety age are deleted. Reconciliation is best-effort, never
//! transactional.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::jobs::record_error;
use crate::store::{normalize_path, AuthStore, BlobStore};

// == Sweep Stats ==
/// Snapshot of the most recent sweep. Replaced wholesale at the end of each
/// pass, partial failures included.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepStats {
    /// Paths listed in the file store
    pub files_scanned: u64,
    /// Paths with no authoritative record, regardless of age
    pub orphaned_files: u64,
    /// Orphans actually deleted this pass
    pub files_deleted: u64,
    /// Pass duration in milliseconds
    pub duration_ms: u64,
    /// Per-file stat/delete failures
    pub errors: Vec<String>,
    /// Completion time of the pass, None before the first pass
    pub completed_at: Option<DateTime<Utc>>,
}

// == Orphan Sweeper ==
/// One-shot reconciliation between authoritative attachment paths and the
/// file store's actual contents.
pub struct OrphanSweeper {
    store: Arc<dyn AuthStore>,
    blobs: Arc<dyn BlobStore>,
    /// Minimum age before an orphan is eligible for deletion
    min_age: Duration,
    stats: RwLock<SweepStats>,
}

impl OrphanSweeper {
    // == Constructor ==
    pub fn new(store: Arc<dyn AuthStore>, blobs: Arc<dyn BlobStore>, min_age_secs: u64) -> Self {
        Self {
            store,
            blobs,
            min_age: Duration::seconds(min_age_secs as i64),
            stats: RwLock::new(SweepStats::default()),
        }
    }

    // == Run Cleanup ==
    /// Runs one reconciliation pass.
    ///
    /// Fetches the authoritative path set, lists the file store, and deletes
    /// every listed path that has no record and is at least `min_age` old.
    /// Younger orphans are skipped; they may belong to an upload whose record
    /// has not committed yet. Per-file stat/delete failures are collected
    /// into the snapshot and never abort the pass; only the two initial
    /// fetches do.
    pub async fn run_cleanup(&self) -> Result<SweepStats> {
        let started = Instant::now();

        let known: HashSet<String> = self
            .store
            .attachment_paths()
            .await?
            .iter()
            .map(|p| normalize_path(p))
            .collect();
        let listed = self.blobs.list_paths().await?;

        let mut stats = SweepStats {
            files_scanned: listed.len() as u64,
            ..SweepStats::default()
        };
        let now = Utc::now();

        for path in listed {
            if known.contains(&normalize_path(&path)) {
                continue;
            }
            stats.orphaned_files += 1;

            let modified = match self.blobs.modified_at(&path).await {
                Ok(modified) => modified,
                Err(e) => {
                    record_error(&mut stats.errors, format!("stat {path}: {e}"));
                    continue;
                }
            };

            if now - modified < self.min_age {
                debug!("skipping young orphan {path}");
                continue;
            }

            match self.blobs.delete(&path).await {
                Ok(()) => stats.files_deleted += 1,
                Err(e) => record_error(&mut stats.errors, format!("delete {path}: {e}")),
            }
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        stats.completed_at = Some(Utc::now());
        *self.stats.write().await = stats.clone();

        info!(
            "orphan sweep: {} scanned, {} orphaned, {} deleted, {} errors",
            stats.files_scanned,
            stats.orphaned_files,
            stats.files_deleted,
            stats.errors.len()
        );
        Ok(stats)
    }

    // == Stats ==
    /// Returns the snapshot of the most recent completed pass. Safe to call
    /// mid-pass; the prior snapshot is returned until the new one publishes.
    pub async fn last_stats(&self) -> SweepStats {
        self.stats.read().await.clone()
    }
}
