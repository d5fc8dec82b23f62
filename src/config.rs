//! Configuration Module
//!
//! Handles loading and managing job configuration from environment variables.

use std::env;

/// Maintenance job configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Session credential validity window in seconds; the ban cache refreshes
    /// a window 10% wider than this to absorb clock skew
    pub session_ttl_secs: u64,
    /// Ban cache refresh interval in seconds
    pub ban_refresh_secs: u64,
    /// Orphaned-upload sweep interval in seconds
    pub orphan_sweep_secs: u64,
    /// Minimum age in seconds before an orphaned upload may be deleted
    pub orphan_min_age_secs: u64,
    /// Thread pruning interval in seconds
    pub prune_interval_secs: u64,
    /// Maximum threads per board; None disables pruning entirely
    pub max_threads_per_board: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECS` - Session validity window (default: 86400)
    /// - `BAN_REFRESH_SECS` - Ban cache refresh interval (default: 300)
    /// - `ORPHAN_SWEEP_SECS` - Orphan sweep interval (default: 3600)
    /// - `ORPHAN_MIN_AGE_SECS` - Orphan deletion safety age (default: 900)
    /// - `PRUNE_INTERVAL_SECS` - Thread pruning interval (default: 600)
    /// - `MAX_THREADS_PER_BOARD` - Per-board thread cap (default: unset, pruning disabled)
    pub fn from_env() -> Self {
        Self {
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400),
            ban_refresh_secs: env::var("BAN_REFRESH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            orphan_sweep_secs: env::var("ORPHAN_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            orphan_min_age_secs: env::var("ORPHAN_MIN_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            prune_interval_secs: env::var("PRUNE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            max_threads_per_board: env::var("MAX_THREADS_PER_BOARD")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&cap: &u64| cap > 0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_ttl_secs: 86_400,
            ban_refresh_secs: 300,
            orphan_sweep_secs: 3600,
            orphan_min_age_secs: 900,
            prune_interval_secs: 600,
            max_threads_per_board: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.session_ttl_secs, 86_400);
        assert_eq!(config.ban_refresh_secs, 300);
        assert_eq!(config.orphan_sweep_secs, 3600);
        assert_eq!(config.orphan_min_age_secs, 900);
        assert_eq!(config.prune_interval_secs, 600);
        assert_eq!(config.max_threads_per_board, None);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SESSION_TTL_SECS");
        env::remove_var("BAN_REFRESH_SECS");
        env::remove_var("ORPHAN_SWEEP_SECS");
        env::remove_var("ORPHAN_MIN_AGE_SECS");
        env::remove_var("PRUNE_INTERVAL_SECS");
        env::remove_var("MAX_THREADS_PER_BOARD");

        let config = Config::from_env();
        assert_eq!(config.session_ttl_secs, 86_400);
        assert_eq!(config.orphan_min_age_secs, 900);
        assert_eq!(config.max_threads_per_board, None);
    }

    #[test]
    fn test_config_zero_cap_disables_pruning() {
        env::set_var("MAX_THREADS_PER_BOARD", "0");
        let config = Config::from_env();
        assert_eq!(config.max_threads_per_board, None);
        env::remove_var("MAX_THREADS_PER_BOARD");
    }
}
