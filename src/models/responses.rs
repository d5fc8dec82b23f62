//! Response DTOs for the operational API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::blacklist::BanCacheStats;
use crate::jobs::{PruneStats, SweepStats};

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status, always "ok" when reachable
    pub status: String,
    /// Number of background jobs this process runs
    pub jobs: usize,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            jobs: 3,
        }
    }
}

/// Response body for GET /stats: the three last-pass snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub ban_cache: BanCacheStats,
    pub orphan_sweep: SweepStats,
    pub board_prune: PruneStats,
}

/// Response body for POST /run/:job
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    /// The job that ran
    pub job: String,
    /// Human-readable outcome summary
    pub message: String,
}

impl RunResponse {
    /// Creates a new RunResponse
    pub fn new(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            message: message.into(),
        }
    }
}
