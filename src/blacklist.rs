//! Ban Cache Module
//!
//! In-memory membership set of recently banned accounts, sitting on the hot
//! authentication path. Session credentials stay valid for a bounded window,
//! so only bans recorded inside that window (plus a skew buffer) can affect a
//! live session; the cache refreshes exactly that slice of the store.
//!
//! The set is rebuilt from scratch on every refresh and swapped in whole:
//! readers see either the previous complete set or the new complete set,
//! never a partially built one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::{AccountId, AuthStore};

// == Ban Cache Stats ==
/// Snapshot of the most recent refresh.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BanCacheStats {
    /// Number of banned accounts currently cached
    pub entries: usize,
    /// Duration of the last successful refresh in milliseconds
    pub duration_ms: u64,
    /// Completion time of the last successful refresh
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Error from the most recent refresh attempt, cleared on success
    pub last_error: Option<String>,
}

// == Ban Cache ==
/// Membership cache of recently banned account ids.
pub struct BanCache {
    store: Arc<dyn AuthStore>,
    /// Session credential validity window in seconds
    session_ttl_secs: u64,
    set: RwLock<HashSet<AccountId>>,
    stats: RwLock<BanCacheStats>,
}

impl BanCache {
    // == Constructor ==
    /// Creates an empty cache. The set stays empty until the first
    /// `refresh()`; it is never persisted across restarts.
    pub fn new(store: Arc<dyn AuthStore>, session_ttl_secs: u64) -> Self {
        Self {
            store,
            session_ttl_secs,
            set: RwLock::new(HashSet::new()),
            stats: RwLock::new(BanCacheStats::default()),
        }
    }

    /// Start of the refresh window: now minus 110% of the session validity
    /// window. The extra 10% absorbs clock skew between credential issuance
    /// and verification.
    fn window_start(&self) -> DateTime<Utc> {
        let window_ms = self.session_ttl_secs.saturating_mul(1100) as i64;
        Utc::now() - Duration::milliseconds(window_ms)
    }

    // == Refresh ==
    /// Rebuilds the membership set from the authoritative store and swaps it
    /// in atomically. The replacement set is built entirely outside the lock;
    /// the write lock is held only for the swap.
    ///
    /// On query failure the previous set is retained unchanged and the error
    /// is recorded in the stats snapshot.
    pub async fn refresh(&self) -> Result<usize> {
        let started = Instant::now();
        let since = self.window_start();

        let ids = match self.store.banned_account_ids_since(since).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("ban cache refresh failed, keeping previous set: {e}");
                self.stats.write().await.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let fresh: HashSet<AccountId> = ids.into_iter().collect();
        let entries = fresh.len();

        {
            let mut set = self.set.write().await;
            *set = fresh;
        }

        let stats = BanCacheStats {
            entries,
            duration_ms: started.elapsed().as_millis() as u64,
            refreshed_at: Some(Utc::now()),
            last_error: None,
        };
        *self.stats.write().await = stats;

        debug!("ban cache refreshed: {entries} entries");
        Ok(entries)
    }

    // == Membership ==
    /// O(1) membership check against the current set. Blocked by an
    /// in-progress refresh only for the swap instant.
    pub async fn is_banned(&self, id: AccountId) -> bool {
        self.set.read().await.contains(&id)
    }

    // == Stats ==
    /// Returns the snapshot of the most recent refresh.
    pub async fn last_stats(&self) -> BanCacheStats {
        self.stats.read().await.clone()
    }
}
