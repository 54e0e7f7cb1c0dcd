//! File-backed backend: an append-only log under a memory table.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::append_log::{self, AppendLog};
use super::memory_url_store::MemoryUrlStore;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{UrlReader, UrlStore, UrlWriter};
use crate::error::StoreError;

/// Durable store that survives restarts by replaying its log.
///
/// Writes go to the log first and only then to memory, so the log is always
/// a superset of the in-memory state. The log lock is held across both steps
/// to keep replay order identical to live write order.
#[derive(Debug)]
pub struct FileUrlStore {
    memory: MemoryUrlStore,
    log: Mutex<AppendLog>,
}

impl FileUrlStore {
    /// Replays the log at `path` into `memory`, then opens it for appending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CorruptLog`] if an entry cannot be decoded and
    /// [`StoreError::Io`] if the file cannot be read or opened.
    pub async fn open(path: impl Into<PathBuf>, memory: MemoryUrlStore) -> Result<Self, StoreError> {
        let path = path.into();

        let loaded = replay(&path, &memory).await?;
        info!(path = %path.display(), records = loaded, "Replayed storage log");

        let log = AppendLog::open(path).await?;

        Ok(Self {
            memory,
            log: Mutex::new(log),
        })
    }

    pub fn memory(&self) -> &MemoryUrlStore {
        &self.memory
    }

    pub async fn path(&self) -> PathBuf {
        self.log.lock().await.path().to_path_buf()
    }
}

/// Loads every entry of the log into `memory`; returns the number of entries.
pub async fn replay(path: &Path, memory: &MemoryUrlStore) -> Result<usize, StoreError> {
    let entries = append_log::read_entries(path).await?;
    let count = entries.len();

    for entry in entries {
        memory.insert(entry.short_url, entry.original_url);
    }

    Ok(count)
}

#[async_trait]
impl UrlReader for FileUrlStore {
    async fn get_url(&self, short_url: &str) -> Result<String, StoreError> {
        self.memory.get_url(short_url).await
    }
}

#[async_trait]
impl UrlWriter for FileUrlStore {
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError> {
        let line = append_log::encode_lines([&record])?;

        let mut log = self.log.lock().await;
        log.append(&line).await?;
        debug!(short_url = %record.short_url, "Appended URL to storage log");
        self.memory.insert(record.short_url, record.original_url);

        Ok(())
    }

    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let lines = append_log::encode_lines(&records)?;

        let mut log = self.log.lock().await;
        log.append(&lines).await?;
        debug!(count = records.len(), "Appended URL batch to storage log");
        for record in records {
            self.memory.insert(record.short_url, record.original_url);
        }

        Ok(())
    }
}

impl UrlStore for FileUrlStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, url: &str) -> UrlRecord {
        UrlRecord::new(code, url, "user-1")
    }

    #[tokio::test]
    async fn save_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUrlStore::open(dir.path().join("urls.json"), MemoryUrlStore::default())
            .await
            .unwrap();

        store
            .save_url(record("abcd1234", "https://example.com"))
            .await
            .unwrap();

        assert_eq!(store.get_url("abcd1234").await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn open_creates_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");

        let store = FileUrlStore::open(&path, MemoryUrlStore::default())
            .await
            .unwrap();

        assert!(path.exists());
        assert!(store.memory().is_empty());
        assert_eq!(store.path().await, path);
    }

    #[tokio::test]
    async fn every_save_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        let store = FileUrlStore::open(&path, MemoryUrlStore::default())
            .await
            .unwrap();

        store
            .save_url(record("aaaa1111", "https://one.com"))
            .await
            .unwrap();
        store
            .save_batch(vec![
                record("bbbb2222", "https://two.com"),
                record("cccc3333", "https://three.com"),
            ])
            .await
            .unwrap();

        let entries = append_log::read_entries(&path).await.unwrap();
        let codes: Vec<_> = entries.iter().map(|e| e.short_url.as_str()).collect();
        assert_eq!(codes, ["aaaa1111", "bbbb2222", "cccc3333"]);
    }

    #[tokio::test]
    async fn overwrite_replays_as_last_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        {
            let store = FileUrlStore::open(&path, MemoryUrlStore::default())
                .await
                .unwrap();
            store
                .save_url(record("abcd1234", "https://old.com"))
                .await
                .unwrap();
            store
                .save_url(record("abcd1234", "https://new.com"))
                .await
                .unwrap();
        }

        let reopened = FileUrlStore::open(&path, MemoryUrlStore::default())
            .await
            .unwrap();

        assert_eq!(reopened.get_url("abcd1234").await.unwrap(), "https://new.com");
        assert_eq!(append_log::read_entries(&path).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn corrupt_log_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        tokio::fs::write(&path, "{\"id\":").await.unwrap();

        let err = FileUrlStore::open(&path, MemoryUrlStore::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::CorruptLog { line: 1, .. }));
    }

    #[tokio::test]
    async fn failed_append_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        let memory = MemoryUrlStore::default();
        let store = FileUrlStore::open(&path, memory.clone()).await.unwrap();

        // Swap the append handle for a read-only one so the next write fails.
        let read_only = tokio::fs::OpenOptions::new()
            .read(true)
            .open(&path)
            .await
            .unwrap();
        *store.log.lock().await = AppendLog::from_file(path.clone(), read_only);

        let result = store
            .save_url(record("abcd1234", "https://example.com"))
            .await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(memory.is_empty());
    }
}
