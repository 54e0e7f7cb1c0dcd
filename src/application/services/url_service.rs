//! URL shortening, resolution and deletion service.

use std::sync::Arc;

use tracing::debug;

use crate::domain::delete_request::PendingDelete;
use crate::domain::delete_worker::DeleteQueue;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlStore;
use crate::error::StoreError;
use crate::utils::token_generator::generate_token;

/// Result of shortening one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub short_url: String,
    /// `false` when the URL was already stored and the existing token is returned.
    pub created: bool,
}

/// One entry of a batch shortening request.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
}

/// One entry of a batch shortening response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchShortened {
    pub correlation_id: String,
    pub short_url: String,
}

/// Orchestrates the selected backend for the request handling layer.
///
/// Works through [`UrlStore`] capability queries, so the same service runs on
/// every backend; calls needing a missing capability fail with
/// [`StoreError::Unsupported`].
pub struct UrlService {
    store: Arc<dyn UrlStore>,
    delete_queue: Option<DeleteQueue>,
}

impl UrlService {
    /// Creates a new service. `delete_queue` is `None` when the backend
    /// cannot delete.
    pub fn new(store: Arc<dyn UrlStore>, delete_queue: Option<DeleteQueue>) -> Self {
        Self {
            store,
            delete_queue,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Shortens `original_url` on behalf of `user_id`.
    ///
    /// If the backend reports the URL as already shortened, the existing
    /// token is returned with `created: false`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn shorten(&self, user_id: &str, original_url: &str) -> Result<Shortened, StoreError> {
        let record = UrlRecord::new(generate_token(), original_url, user_id);
        let short_url = record.short_url.clone();

        match self.store.save_url(record).await {
            Ok(()) => Ok(Shortened {
                short_url,
                created: true,
            }),
            Err(StoreError::Conflict { short_url }) => {
                debug!(%short_url, "Returning existing token");
                Ok(Shortened {
                    short_url,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Shortens many URLs at once, echoing each correlation id.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyBatch`] if `items` is empty. Otherwise propagates
    /// backend failures; on the relational backend nothing from the batch is
    /// stored in that case.
    pub async fn shorten_batch(
        &self,
        user_id: &str,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchShortened>, StoreError> {
        if items.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut records = Vec::with_capacity(items.len());
        let mut response = Vec::with_capacity(items.len());

        for item in items {
            let record = UrlRecord::new(generate_token(), item.original_url, user_id);
            response.push(BatchShortened {
                correlation_id: item.correlation_id,
                short_url: record.short_url.clone(),
            });
            records.push(record);
        }

        self.store.save_batch(records).await?;

        Ok(response)
    }

    /// Resolves a token to its original URL.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] or [`StoreError::Deleted`] as reported by the
    /// backend.
    pub async fn resolve(&self, short_url: &str) -> Result<String, StoreError> {
        self.store.get_url(short_url).await
    }

    /// Lists every record owned by `user_id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unsupported`] on backends without per-user scoping.
    pub async fn user_urls(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError> {
        let scoped = self
            .store
            .as_user_scoped()
            .ok_or_else(|| self.unsupported("listing URLs by user"))?;

        scoped.get_urls_by_user_id(user_id).await
    }

    /// Accepts deletion of `candidates` on behalf of `user_id`.
    ///
    /// Tokens the user does not own or that are already deleted are silently
    /// skipped. The rest are queued for the next flush; the returned count is
    /// what was accepted, not what has been applied.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unsupported`] if the backend cannot scope by user, cannot
    /// batch-delete, or no delete worker is running.
    pub async fn request_deletion(
        &self,
        user_id: &str,
        candidates: &[String],
    ) -> Result<usize, StoreError> {
        let scoped = self
            .store
            .as_user_scoped()
            .ok_or_else(|| self.unsupported("deleting URLs"))?;
        if self.store.as_batch_deletable().is_none() {
            return Err(self.unsupported("deleting URLs"));
        }
        let queue = self
            .delete_queue
            .as_ref()
            .ok_or_else(|| self.unsupported("deleting URLs"))?;

        let owned = scoped.filter_urls_by_user_id(user_id, candidates).await?;
        let accepted = owned.len();

        for record in owned {
            queue.enqueue(PendingDelete::from(record));
        }

        debug!(user_id, accepted, requested = candidates.len(), "Deletion accepted");

        Ok(accepted)
    }

    /// Checks backend liveness.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unsupported`] on backends without a liveness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let pingable = self
            .store
            .as_pingable()
            .ok_or_else(|| self.unsupported("ping"))?;

        pingable.ping().await
    }

    fn unsupported(&self, capability: &'static str) -> StoreError {
        StoreError::unsupported(capability, self.store.backend_name())
    }
}
