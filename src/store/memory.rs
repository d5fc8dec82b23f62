//! In-Memory Store Implementations
//!
//! Self-contained `AuthStore`/`ThreadDeleter`/`BlobStore` implementations
//! backed by plain maps, with failure injection. Used by the test suites and
//! by embedding hosts that want to exercise the jobs without a real backend.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::{JanitorError, Result};
use crate::store::{AccountId, AuthStore, BlobStore, ThreadDeleter, ThreadId};

// == Memory Auth Store ==

#[derive(Debug)]
struct ThreadEntry {
    id: ThreadId,
    attachments: Vec<String>,
}

#[derive(Debug, Default)]
struct StoreInner {
    bans: Vec<(AccountId, DateTime<Utc>)>,
    attachments: HashSet<String>,
    /// Per-board threads in creation order, oldest first.
    boards: BTreeMap<String, Vec<ThreadEntry>>,
    deleted: Vec<(String, ThreadId)>,
    fail_ban_query: bool,
    fail_attachment_paths: bool,
    fail_board_slugs: bool,
    fail_count_boards: HashSet<String>,
    fail_delete_ids: HashSet<ThreadId>,
}

/// In-memory authoritative store with failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a ban for an account at the given time.
    pub fn add_ban(&self, id: AccountId, banned_at: DateTime<Utc>) {
        self.inner.lock().unwrap().bans.push((id, banned_at));
    }

    /// Records a ban as of now.
    pub fn add_recent_ban(&self, id: AccountId) {
        self.add_ban(id, Utc::now());
    }

    /// Creates an empty board.
    pub fn add_board(&self, slug: &str) {
        self.inner
            .lock()
            .unwrap()
            .boards
            .entry(slug.to_string())
            .or_default();
    }

    /// Appends a thread to a board. Threads age in insertion order, so the
    /// first thread added is the oldest.
    pub fn add_thread(&self, board: &str, id: ThreadId) {
        self.add_thread_with_attachments(board, id, &[]);
    }

    /// Appends a thread carrying attachment paths; the paths also become
    /// part of the authoritative attachment set.
    pub fn add_thread_with_attachments(&self, board: &str, id: ThreadId, paths: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        for path in paths {
            inner.attachments.insert(path.to_string());
        }
        inner
            .boards
            .entry(board.to_string())
            .or_default()
            .push(ThreadEntry {
                id,
                attachments: paths.iter().map(|p| p.to_string()).collect(),
            });
    }

    /// Adds a standalone attachment path to the authoritative set.
    pub fn add_attachment(&self, path: &str) {
        self.inner
            .lock()
            .unwrap()
            .attachments
            .insert(path.to_string());
    }

    /// Returns every thread deletion performed, in order.
    pub fn deleted_threads(&self) -> Vec<(String, ThreadId)> {
        self.inner.lock().unwrap().deleted.clone()
    }

    pub fn fail_ban_query(&self) {
        self.inner.lock().unwrap().fail_ban_query = true;
    }

    pub fn fail_attachment_paths(&self) {
        self.inner.lock().unwrap().fail_attachment_paths = true;
    }

    pub fn fail_board_slugs(&self) {
        self.inner.lock().unwrap().fail_board_slugs = true;
    }

    pub fn fail_thread_count(&self, board: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_count_boards
            .insert(board.to_string());
    }

    pub fn fail_delete(&self, id: ThreadId) {
        self.inner.lock().unwrap().fail_delete_ids.insert(id);
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn banned_account_ids_since(&self, since: DateTime<Utc>) -> Result<Vec<AccountId>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_ban_query {
            return Err(JanitorError::Store("ban query unavailable".to_string()));
        }
        Ok(inner
            .bans
            .iter()
            .filter(|(_, at)| *at >= since)
            .map(|(id, _)| *id)
            .collect())
    }

    async fn attachment_paths(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_attachment_paths {
            return Err(JanitorError::Store(
                "attachment query unavailable".to_string(),
            ));
        }
        Ok(inner.attachments.iter().cloned().collect())
    }

    async fn board_slugs(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_board_slugs {
            return Err(JanitorError::Store("board query unavailable".to_string()));
        }
        Ok(inner.boards.keys().cloned().collect())
    }

    async fn thread_count(&self, board: &str) -> Result<u64> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_count_boards.contains(board) {
            return Err(JanitorError::Store(format!(
                "thread count unavailable for /{board}/"
            )));
        }
        Ok(inner.boards.get(board).map_or(0, |t| t.len() as u64))
    }

    async fn oldest_thread_id(&self, board: &str) -> Result<Option<ThreadId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .boards
            .get(board)
            .and_then(|threads| threads.first())
            .map(|t| t.id))
    }
}

#[async_trait]
impl ThreadDeleter for MemoryStore {
    async fn delete_thread(&self, board: &str, id: ThreadId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete_ids.contains(&id) {
            return Err(JanitorError::Store(format!(
                "delete failed for /{board}/{id}"
            )));
        }
        let entry = {
            let Some(threads) = inner.boards.get_mut(board) else {
                return Err(JanitorError::Store(format!("no such board /{board}/")));
            };
            let Some(position) = threads.iter().position(|t| t.id == id) else {
                return Err(JanitorError::Store(format!("no such thread /{board}/{id}")));
            };
            threads.remove(position)
        };
        // Cascade: the thread's attachments leave the authoritative set
        for path in &entry.attachments {
            inner.attachments.remove(path);
        }
        inner.deleted.push((board.to_string(), id));
        Ok(())
    }
}

// == Memory Blob Store ==

#[derive(Debug, Default)]
struct BlobInner {
    files: BTreeMap<String, DateTime<Utc>>,
    deleted: Vec<String>,
    fail_list: bool,
    fail_stat: HashSet<String>,
    fail_delete: HashSet<String>,
}

/// In-memory file store keyed by relative path, with failure injection.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    inner: Mutex<BlobInner>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a path with an explicit last-modified time.
    pub fn insert(&self, path: &str, modified: DateTime<Utc>) {
        self.inner
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), modified);
    }

    /// Stores a path last modified `age_secs` seconds ago.
    pub fn insert_aged(&self, path: &str, age_secs: i64) {
        self.insert(path, Utc::now() - Duration::seconds(age_secs));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().unwrap().files.contains_key(path)
    }

    /// Returns every deletion performed, in order.
    pub fn deleted_paths(&self) -> Vec<String> {
        self.inner.lock().unwrap().deleted.clone()
    }

    pub fn fail_list(&self) {
        self.inner.lock().unwrap().fail_list = true;
    }

    pub fn fail_stat(&self, path: &str) {
        self.inner.lock().unwrap().fail_stat.insert(path.to_string());
    }

    pub fn fail_delete(&self, path: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_delete
            .insert(path.to_string());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn list_paths(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(JanitorError::FileStore("listing unavailable".to_string()));
        }
        Ok(inner.files.keys().cloned().collect())
    }

    async fn modified_at(&self, path: &str) -> Result<DateTime<Utc>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_stat.contains(path) {
            return Err(JanitorError::FileStore(format!("stat failed: {path}")));
        }
        inner
            .files
            .get(path)
            .copied()
            .ok_or_else(|| JanitorError::FileStore(format!("no such file: {path}")))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete.contains(path) {
            return Err(JanitorError::FileStore(format!("delete failed: {path}")));
        }
        if inner.files.remove(path).is_none() {
            return Err(JanitorError::FileStore(format!("no such file: {path}")));
        }
        inner.deleted.push(path.to_string());
        Ok(())
    }
}
