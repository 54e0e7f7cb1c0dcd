//! Capability traits implemented by the store backends.

use crate::domain::delete_request::PendingDelete;
use crate::domain::entities::UrlRecord;
use crate::error::StoreError;
use async_trait::async_trait;

/// Resolves tokens back to original URLs.
#[async_trait]
pub trait UrlReader: Send + Sync {
    /// Returns the original URL for a token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the token never existed.
    /// Returns [`StoreError::Deleted`] if the token was withdrawn by its owner
    /// (only backends that track deletion).
    async fn get_url(&self, short_url: &str) -> Result<String, StoreError>;
}

/// Persists new URL mappings.
#[async_trait]
pub trait UrlWriter: Send + Sync {
    /// Saves a single mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] carrying the existing token when the
    /// backend enforces original URL uniqueness and the URL is already stored.
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError>;

    /// Saves many mappings at once.
    ///
    /// The relational backend applies the batch atomically.
    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<(), StoreError>;
}

/// Liveness probe for backends with an external dependency.
#[async_trait]
pub trait Pingable: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Per-identity queries.
#[async_trait]
pub trait UserScoped: Send + Sync {
    /// Lists every record owned by `user_id`, deleted ones included.
    async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError>;

    /// Keeps only the candidates owned by `user_id` that are not deleted yet.
    async fn filter_urls_by_user_id(
        &self,
        user_id: &str,
        candidates: &[String],
    ) -> Result<Vec<UrlRecord>, StoreError>;
}

/// Bulk soft deletion, driven by the delete worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchDeletable: Send + Sync {
    /// Marks every entry of `batch` as deleted, all or nothing.
    async fn delete_urls(&self, batch: &[PendingDelete]) -> Result<(), StoreError>;
}

/// A complete backend: the reader/writer pair plus capability queries.
///
/// Optional capabilities are discovered through the `as_*` accessors instead
/// of downcasting, so swapping backends never changes call sites.
pub trait UrlStore: UrlReader + UrlWriter {
    /// Short backend name used in logs and `Unsupported` errors.
    fn backend_name(&self) -> &'static str;

    fn as_pingable(&self) -> Option<&dyn Pingable> {
        None
    }

    fn as_user_scoped(&self) -> Option<&dyn UserScoped> {
        None
    }

    fn as_batch_deletable(&self) -> Option<&dyn BatchDeletable> {
        None
    }
}
