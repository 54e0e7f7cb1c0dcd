//! Store layer startup and shutdown.
//!
//! Selects the backend, starts the delete worker when the backend supports
//! bulk deletion and wires both into a [`UrlService`].

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::application::services::UrlService;
use crate::config::Config;
use crate::domain::delete_worker::spawn_delete_worker;
use crate::error::StoreError;
use crate::infrastructure::store_selector::{Backend, select_backend};

/// Running store layer: the service plus the delete worker handle.
pub struct StoreRuntime {
    backend: Backend,
    service: UrlService,
    worker: Option<JoinHandle<()>>,
}

impl StoreRuntime {
    pub fn service(&self) -> &UrlService {
        &self.service
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Closes the delete intake and waits for the final flush.
    pub async fn shutdown(self) {
        let Self {
            backend,
            service,
            worker,
        } = self;

        // Dropping the service drops the last queue handle.
        drop(service);

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "Delete worker panicked");
            }
            info!("Delete worker stopped");
        }

        info!(backend = backend.name(), "Store layer shut down");
    }
}

/// Starts the store layer described by `config`.
///
/// # Errors
///
/// Returns whatever [`select_backend`] fails with; nothing is spawned in that
/// case.
pub async fn start(config: &Config) -> Result<StoreRuntime, StoreError> {
    let backend = select_backend(config).await?;

    let (queue, worker) = match backend.batch_deleter() {
        Some(deleter) => {
            let (queue, worker) = spawn_delete_worker(deleter, config.delete_flush_interval());
            info!(
                interval_secs = config.delete_flush_interval_secs,
                "Delete worker started"
            );
            (Some(queue), Some(worker))
        }
        None => (None, None),
    };

    let service = UrlService::new(backend.store(), queue);

    Ok(StoreRuntime {
        backend,
        service,
        worker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_runtime_has_no_worker() {
        let runtime = start(&Config::default()).await.unwrap();

        assert!(runtime.worker.is_none());
        assert_eq!(runtime.service().backend_name(), "memory");

        let shortened = runtime
            .service()
            .shorten("user-1", "https://example.com")
            .await
            .unwrap();
        assert_eq!(
            runtime.service().resolve(&shortened.short_url).await.unwrap(),
            "https://example.com"
        );

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_file_path_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            // A directory cannot be opened as the log file.
            file_storage_path: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        assert!(start(&config).await.is_err());
    }
}
