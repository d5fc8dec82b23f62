//! API Handlers
//!
//! HTTP request handlers for the operational endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::blacklist::BanCache;
use crate::config::Config;
use crate::error::{JanitorError, Result};
use crate::jobs::{BoardPruner, OrphanSweeper};
use crate::models::{HealthResponse, RunResponse, StatsResponse};
use crate::store::{AuthStore, BlobStore, ThreadDeleter};

/// Shared handles to the three maintenance jobs.
///
/// The same handles drive the periodic schedule and the operational API, so
/// a manually triggered pass and a scheduled one are the same code path.
#[derive(Clone)]
pub struct AppState {
    pub bans: Arc<BanCache>,
    pub sweeper: Arc<OrphanSweeper>,
    pub pruner: Arc<BoardPruner>,
}

impl AppState {
    /// Creates an AppState from already-constructed jobs.
    pub fn new(bans: BanCache, sweeper: OrphanSweeper, pruner: BoardPruner) -> Self {
        Self {
            bans: Arc::new(bans),
            sweeper: Arc::new(sweeper),
            pruner: Arc::new(pruner),
        }
    }

    /// Builds all three jobs over the given collaborators using the
    /// configured windows, ages, and caps.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn AuthStore>,
        deleter: Arc<dyn ThreadDeleter>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self::new(
            BanCache::new(store.clone(), config.session_ttl_secs),
            OrphanSweeper::new(store.clone(), blobs, config.orphan_min_age_secs),
            BoardPruner::new(store, deleter, config.max_threads_per_board),
        )
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Handler for GET /stats
///
/// Returns the last-pass snapshot of every job. Safe while passes are in
/// flight; each job publishes its snapshot atomically at end of pass.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        ban_cache: state.bans.last_stats().await,
        orphan_sweep: state.sweeper.last_stats().await,
        board_prune: state.pruner.last_stats().await,
    })
}

/// Handler for POST /run/:job
///
/// Runs one job's pass synchronously, outside its schedule. Job names:
/// `ban-cache`, `orphan-sweep`, `board-prune`.
pub async fn run_handler(
    State(state): State<AppState>,
    Path(job): Path<String>,
) -> Result<Json<RunResponse>> {
    let message = match job.as_str() {
        "ban-cache" => {
            let entries = state.bans.refresh().await?;
            format!("refreshed, {entries} banned accounts cached")
        }
        "orphan-sweep" => {
            let stats = state.sweeper.run_cleanup().await?;
            format!(
                "deleted {} of {} orphaned files",
                stats.files_deleted, stats.orphaned_files
            )
        }
        "board-prune" => {
            let stats = state.pruner.run_cleanup().await?;
            format!(
                "deleted {} threads across {} boards",
                stats.threads_deleted, stats.boards_scanned
            )
        }
        _ => return Err(JanitorError::UnknownJob(job)),
    };

    Ok(Json(RunResponse::new(job, message)))
}
