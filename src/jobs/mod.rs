//! Background Jobs Module
//!
//! The three periodic maintenance jobs and the supervisor glue that starts
//! and stops them together:
//! - ban cache refresh (`crate::blacklist`)
//! - orphaned upload sweep
//! - per-board thread pruning
//!
//! Jobs share no locks and tick on independent fixed intervals; a slow or
//! failing pass in one never affects the others.

mod orphan;
mod periodic;
mod prune;


pub use orphan::{OrphanSweeper, SweepStats};
pub use periodic::spawn_periodic;
pub use prune::{BoardPruner, PruneStats};

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::AppState;
use crate::config::Config;

// == Pass Error List ==
/// Cap on the per-pass error list; under persistent failure an uncapped list
/// grows for the lifetime of the pass.
pub const MAX_PASS_ERRORS: usize = 64;

/// Appends to a pass's error list, truncating past [`MAX_PASS_ERRORS`].
pub(crate) fn record_error(errors: &mut Vec<String>, message: String) {
    if errors.len() < MAX_PASS_ERRORS {
        errors.push(message);
    } else if errors.len() == MAX_PASS_ERRORS {
        errors.push(format!("further errors truncated at {MAX_PASS_ERRORS}"));
    }
}

// == Job Handles ==
/// Handles to the running background jobs.
///
/// Dropping the handles detaches the jobs; call [`JobHandles::shutdown`] to
/// stop them gracefully.
pub struct JobHandles {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl JobHandles {
    /// Signals every job to stop after its current pass.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels the jobs and waits for each to finish its in-flight pass.
    pub async fn shutdown(self) {
        self.token.cancel();
        for handle in self.handles {
            // A panicked job task is already logged; nothing left to do here
            let _ = handle.await;
        }
    }
}

// == Supervisor ==
/// Starts all three maintenance jobs on their configured intervals.
///
/// Each job runs in its own task under a shared cancellation token; passes
/// of different jobs may run concurrently, passes of one job never overlap.
pub fn start_jobs(state: &AppState, config: &Config) -> JobHandles {
    let token = CancellationToken::new();
    let mut handles = Vec::new();

    let bans = state.bans.clone();
    handles.push(spawn_periodic(
        "ban-cache-refresh",
        Duration::from_secs(config.ban_refresh_secs),
        token.child_token(),
        move || {
            let bans = bans.clone();
            async move { bans.refresh().await }
        },
    ));

    let sweeper = state.sweeper.clone();
    handles.push(spawn_periodic(
        "orphan-sweep",
        Duration::from_secs(config.orphan_sweep_secs),
        token.child_token(),
        move || {
            let sweeper = sweeper.clone();
            async move { sweeper.run_cleanup().await }
        },
    ));

    let pruner = state.pruner.clone();
    handles.push(spawn_periodic(
        "board-prune",
        Duration::from_secs(config.prune_interval_secs),
        token.child_token(),
        move || {
            let pruner = pruner.clone();
            async move { pruner.run_cleanup().await }
        },
    ));

    JobHandles { token, handles }
}
