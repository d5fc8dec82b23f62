//! Store Module
//!
//! Narrow interfaces onto the collaborators this subsystem consumes: the
//! authoritative store owning accounts/boards/threads, the CRUD layer's
//! cascading thread deletion, and the file store holding uploaded
//! attachments. The jobs never touch those systems any other way.

mod fs;
mod memory;

pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

// == Identifiers ==
/// Account identifier as assigned by the authoritative store.
pub type AccountId = i64;

/// Thread identifier, unique within a board.
pub type ThreadId = i64;

// == Authoritative Store ==
/// Read-only queries against the authoritative store.
#[async_trait]
pub trait AuthStore: Send + Sync + 'static {
    /// Returns ids of accounts whose ban was recorded at or after `since`.
    async fn banned_account_ids_since(&self, since: DateTime<Utc>) -> Result<Vec<AccountId>>;

    /// Returns every attachment path known to the authoritative store,
    /// relative to the file-store root.
    async fn attachment_paths(&self) -> Result<Vec<String>>;

    /// Returns the slugs of all boards.
    async fn board_slugs(&self) -> Result<Vec<String>>;

    /// Returns the current number of threads on a board. Queried fresh on
    /// every pass, never cached.
    async fn thread_count(&self, board: &str) -> Result<u64>;

    /// Returns the id of the oldest remaining thread on a board, by
    /// creation order, or None if the board is empty.
    async fn oldest_thread_id(&self, board: &str) -> Result<Option<ThreadId>>;
}

// == Thread Deletion ==
/// Cascading thread deletion, owned by the CRUD layer. Deleting a thread
/// also removes its messages and their attachment files.
#[async_trait]
pub trait ThreadDeleter: Send + Sync + 'static {
    async fn delete_thread(&self, board: &str, id: ThreadId) -> Result<()>;
}

// == Blob Store ==
/// Durable storage for uploaded file content, addressed by relative path.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Lists every path currently present, relative to the store root.
    async fn list_paths(&self) -> Result<Vec<String>>;

    /// Returns the last-modified time of a path.
    async fn modified_at(&self, path: &str) -> Result<DateTime<Utc>>;

    /// Deletes a path.
    async fn delete(&self, path: &str) -> Result<()>;
}

// == Path Normalization ==
/// Normalizes a relative storage path to forward-slash form so paths from
/// the authoritative store and the file store compare equal regardless of
/// platform conventions.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}
