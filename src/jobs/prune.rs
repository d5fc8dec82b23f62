//! Board Pruner
//!
//! Enforces the per-board thread cap in the background. Boards grow past the
//! cap between passes (and whenever the cap is lowered); each pass deletes
//! the oldest threads until the board is back at the cap, through the CRUD
//! layer's cascading delete so messages and attachments go with them.
//! Pruning in the background keeps cap enforcement off the posting path.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::jobs::record_error;
use crate::store::{AuthStore, ThreadDeleter};

// == Prune Stats ==
/// Snapshot of the most recent pruning pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneStats {
    /// Boards whose count was checked
    pub boards_scanned: u64,
    /// Boards found over the cap
    pub boards_over_cap: u64,
    /// Threads deleted across all boards
    pub threads_deleted: u64,
    /// Pass duration in milliseconds
    pub duration_ms: u64,
    /// Per-board count/fetch/delete failures
    pub errors: Vec<String>,
    /// Completion time of the pass, None before the first pass
    pub completed_at: Option<DateTime<Utc>>,
}

// == Board Pruner ==
/// Per-board thread-count enforcement against a global cap.
pub struct BoardPruner {
    store: Arc<dyn AuthStore>,
    deleter: Arc<dyn ThreadDeleter>,
    /// None disables pruning entirely
    max_threads: Option<u64>,
    stats: RwLock<PruneStats>,
}

impl BoardPruner {
    // == Constructor ==
    pub fn new(
        store: Arc<dyn AuthStore>,
        deleter: Arc<dyn ThreadDeleter>,
        max_threads: Option<u64>,
    ) -> Self {
        Self {
            store,
            deleter,
            max_threads,
            stats: RwLock::new(PruneStats::default()),
        }
    }

    // == Run Cleanup ==
    /// Runs one pruning pass over every board.
    ///
    /// Each board's count is queried fresh; a board over the cap has its
    /// oldest threads deleted one at a time until `count - cap` deletions
    /// have happened. Any failure inside one board stops work on that board
    /// only; the pass records the error and moves to the next board. Only a
    /// failure to list the boards aborts the pass. Without a configured cap
    /// the pass is a no-op.
    pub async fn run_cleanup(&self) -> Result<PruneStats> {
        let Some(cap) = self.max_threads else {
            debug!("board prune: no cap configured, skipping");
            return Ok(PruneStats::default());
        };

        let started = Instant::now();
        let boards = self.store.board_slugs().await?;

        let mut stats = PruneStats::default();
        for board in boards {
            stats.boards_scanned += 1;

            let count = match self.store.thread_count(&board).await {
                Ok(count) => count,
                Err(e) => {
                    record_error(&mut stats.errors, format!("count /{board}/: {e}"));
                    continue;
                }
            };
            if count <= cap {
                continue;
            }
            stats.boards_over_cap += 1;

            // Delete until back at the cap, oldest first; a burst or a
            // lowered cap can put a board over by more than one
            let excess = count - cap;
            for _ in 0..excess {
                let id = match self.store.oldest_thread_id(&board).await {
                    Ok(Some(id)) => id,
                    Ok(None) => break,
                    Err(e) => {
                        record_error(&mut stats.errors, format!("oldest /{board}/: {e}"));
                        break;
                    }
                };
                match self.deleter.delete_thread(&board, id).await {
                    Ok(()) => stats.threads_deleted += 1,
                    Err(e) => {
                        record_error(&mut stats.errors, format!("delete /{board}/{id}: {e}"));
                        break;
                    }
                }
            }
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        stats.completed_at = Some(Utc::now());
        *self.stats.write().await = stats.clone();

        info!(
            "board prune: {} boards, {} over cap, {} threads deleted, {} errors",
            stats.boards_scanned,
            stats.boards_over_cap,
            stats.threads_deleted,
            stats.errors.len()
        );
        Ok(stats)
    }

    // == Stats ==
    /// Returns the snapshot of the most recent completed pass.
    pub async fn last_stats(&self) -> PruneStats {
        self.stats.read().await.clone()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn pruner(store: Arc<MemoryStore>, cap: Option<u64>) -> BoardPruner {
        BoardPruner::new(store.clone(), store, cap)
    }

    #[tokio::test]
    async fn test_no_cap_is_a_noop() {
        let store = Arc::new(MemoryStore::new());
        for id in 1..=50 {
            store.add_thread("tech", id);
        }

        let stats = pruner(store.clone(), None).run_cleanup().await.unwrap();
        assert_eq!(stats.boards_scanned, 0);
        assert_eq!(store.thread_count("tech").await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_board_at_cap_untouched() {
        let store = Arc::new(MemoryStore::new());
        for id in 1..=3 {
            store.add_thread("tech", id);
        }

        let stats = pruner(store.clone(), Some(3)).run_cleanup().await.unwrap();
        assert_eq!(stats.boards_over_cap, 0);
        assert_eq!(stats.threads_deleted, 0);
    }

    #[tokio::test]
    async fn test_oldest_threads_evicted_first() {
        let store = Arc::new(MemoryStore::new());
        for id in [1, 2, 3, 4, 5] {
            store.add_thread("tech", id);
        }

        let stats = pruner(store.clone(), Some(3)).run_cleanup().await.unwrap();

        assert_eq!(stats.threads_deleted, 2);
        assert_eq!(
            store.deleted_threads(),
            vec![("tech".to_string(), 1), ("tech".to_string(), 2)]
        );
        assert_eq!(store.thread_count("tech").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_burst_over_cap_fully_drained() {
        let store = Arc::new(MemoryStore::new());
        for id in 1..=15 {
            store.add_thread("tech", id);
        }

        let stats = pruner(store.clone(), Some(10)).run_cleanup().await.unwrap();

        assert_eq!(stats.threads_deleted, 5);
        assert_eq!(store.thread_count("tech").await.unwrap(), 10);
        // Strictly oldest first
        let deleted: Vec<_> = store.deleted_threads().iter().map(|(_, id)| *id).collect();
        assert_eq!(deleted, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_one_board_failure_does_not_stop_others() {
        let store = Arc::new(MemoryStore::new());
        for id in 1..=5 {
            store.add_thread("anime", id);
        }
        for id in 10..=14 {
            store.add_thread("tech", id);
        }
        // "anime" sorts first and its delete fails immediately
        store.fail_delete(1);

        let stats = pruner(store.clone(), Some(3)).run_cleanup().await.unwrap();

        assert_eq!(stats.errors.len(), 1);
        assert_eq!(store.thread_count("tech").await.unwrap(), 3);
        assert_eq!(store.thread_count("anime").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_count_failure_is_per_board() {
        let store = Arc::new(MemoryStore::new());
        store.add_board("broken");
        store.fail_thread_count("broken");
        for id in 1..=4 {
            store.add_thread("tech", id);
        }

        let stats = pruner(store.clone(), Some(3)).run_cleanup().await.unwrap();

        assert_eq!(stats.boards_scanned, 2);
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.threads_deleted, 1);
    }

    #[tokio::test]
    async fn test_board_list_failure_aborts_pass() {
        let store = Arc::new(MemoryStore::new());
        store.fail_board_slugs();

        let pruner = pruner(store, Some(3));
        assert!(pruner.run_cleanup().await.is_err());
        assert!(pruner.last_stats().await.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_lowered_cap_drains_to_new_cap() {
        let store = Arc::new(MemoryStore::new());
        for id in 1..=10 {
            store.add_thread("tech", id);
        }

        pruner(store.clone(), Some(10)).run_cleanup().await.unwrap();
        assert_eq!(store.thread_count("tech").await.unwrap(), 10);

        // Operator lowers the cap; the next pass drains down to it
        pruner(store.clone(), Some(4)).run_cleanup().await.unwrap();
        assert_eq!(store.thread_count("tech").await.unwrap(), 4);
    }
}
