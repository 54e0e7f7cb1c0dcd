//! Volatile in-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{UrlReader, UrlStore, UrlWriter};
use crate::error::StoreError;

/// Shared token → original URL table.
///
/// Built once by the store selector and handed to every backend that needs
/// it. `DashMap` shards its locks, so readers and writers never need outside
/// synchronization.
pub type UrlTable = Arc<DashMap<String, String>>;

/// Memory-only store: last write wins, no ownership, no deletion tracking.
#[derive(Debug, Clone, Default)]
pub struct MemoryUrlStore {
    table: UrlTable,
}

impl MemoryUrlStore {
    /// Creates a store over an existing table.
    pub fn new(table: UrlTable) -> Self {
        Self { table }
    }

    /// Number of distinct tokens held.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub(crate) fn insert(&self, short_url: String, original_url: String) {
        self.table.insert(short_url, original_url);
    }
}

#[async_trait]
impl UrlReader for MemoryUrlStore {
    async fn get_url(&self, short_url: &str) -> Result<String, StoreError> {
        self.table
            .get(short_url)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::not_found(short_url))
    }
}

#[async_trait]
impl UrlWriter for MemoryUrlStore {
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError> {
        debug!(short_url = %record.short_url, "Storing URL in memory");
        self.insert(record.short_url, record.original_url);
        Ok(())
    }

    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<(), StoreError> {
        for record in records {
            self.insert(record.short_url, record.original_url);
        }
        Ok(())
    }
}

impl UrlStore for MemoryUrlStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
