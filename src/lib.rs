//! Board Janitor - background maintenance for a message-board backend
//!
//! Keeps derived and cached state consistent with the authoritative store
//! without blocking request-serving paths. Three independent periodic jobs:
//! a banned-account membership cache, an orphaned-upload sweeper, and a
//! per-board thread pruner.

pub mod api;
pub mod blacklist;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod store;

pub use api::AppState;
pub use blacklist::BanCache;
pub use config::Config;
pub use jobs::{start_jobs, BoardPruner, JobHandles, OrphanSweeper};
