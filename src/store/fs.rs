//! Filesystem Blob Store
//!
//! `BlobStore` implementation over a local upload directory, the storage
//! layout used by single-node deployments. Paths are reported relative to
//! the root in normalized forward-slash form.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::error::{JanitorError, Result};
use crate::store::{normalize_path, BlobStore};

/// File store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a relative path against the root. Parent-directory
    /// components are rejected so a caller can never escape the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let normalized = normalize_path(path);
        if normalized.split('/').any(|part| part == "..") {
            return Err(JanitorError::FileStore(format!(
                "path escapes store root: {path}"
            )));
        }
        Ok(self.root.join(normalized))
    }

    fn relative_to_root(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(|p| p.to_str())
            .map(normalize_path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn list_paths(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| JanitorError::FileStore(format!("list {}: {e}", dir.display())))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| JanitorError::FileStore(format!("list {}: {e}", dir.display())))?
            {
                let entry_path = entry.path();
                let file_type = entry.file_type().await.map_err(|e| {
                    JanitorError::FileStore(format!("stat {}: {e}", entry_path.display()))
                })?;
                if file_type.is_dir() {
                    pending.push(entry_path);
                } else if let Some(relative) = self.relative_to_root(&entry_path) {
                    paths.push(relative);
                }
            }
        }

        Ok(paths)
    }

    async fn modified_at(&self, path: &str) -> Result<DateTime<Utc>> {
        let full = self.resolve(path)?;
        let metadata = fs::metadata(&full)
            .await
            .map_err(|e| JanitorError::FileStore(format!("stat {path}: {e}")))?;
        let modified = metadata
            .modified()
            .map_err(|e| JanitorError::FileStore(format!("stat {path}: {e}")))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        fs::remove_file(&full)
            .await
            .map_err(|e| JanitorError::FileStore(format!("delete {path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(root: &Path, relative: &str) {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, b"data").unwrap();
    }

    #[tokio::test]
    async fn test_list_paths_recurses_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.jpg");
        write_file(dir.path(), "img/2024/b.png");

        let store = FsBlobStore::new(dir.path());
        let mut paths = store.list_paths().await.unwrap();
        paths.sort();
        assert_eq!(paths, vec!["a.jpg", "img/2024/b.png"]);
    }

    #[tokio::test]
    async fn test_modified_at_is_recent_for_new_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.jpg");

        let store = FsBlobStore::new(dir.path());
        let modified = store.modified_at("a.jpg").await.unwrap();
        let age = Utc::now() - modified;
        assert!(age.num_seconds() < 60, "fresh file should have near-zero age");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "img/a.jpg");

        let store = FsBlobStore::new(dir.path());
        store.delete("img/a.jpg").await.unwrap();
        assert!(!dir.path().join("img/a.jpg").exists());
    }

    #[tokio::test]
    async fn test_stat_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        assert!(store.modified_at("missing.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_parent_components_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        assert!(store.delete("../outside.jpg").await.is_err());
    }
}
