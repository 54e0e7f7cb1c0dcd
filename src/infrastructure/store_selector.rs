//! Builds exactly one backend from configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{Config, StorageTarget};
use crate::domain::repositories::{BatchDeletable, UrlStore};
use crate::error::StoreError;
use crate::infrastructure::persistence::{FileUrlStore, MemoryUrlStore, PgUrlStore, UrlTable};

/// The backend chosen at startup.
///
/// Selected once; call sites work through [`Backend::store`] and never branch
/// on which variant is active.
pub enum Backend {
    Memory(Arc<MemoryUrlStore>),
    File(Arc<FileUrlStore>),
    Postgres(Arc<PgUrlStore>),
}

impl Backend {
    /// The backend as a shared store handle.
    pub fn store(&self) -> Arc<dyn UrlStore> {
        match self {
            Self::Memory(store) => store.clone() as Arc<dyn UrlStore>,
            Self::File(store) => store.clone() as Arc<dyn UrlStore>,
            Self::Postgres(store) => store.clone() as Arc<dyn UrlStore>,
        }
    }

    /// Owned handle for the delete worker, when the backend supports it.
    pub fn batch_deleter(&self) -> Option<Arc<dyn BatchDeletable>> {
        match self {
            Self::Postgres(store) => Some(store.clone() as Arc<dyn BatchDeletable>),
            Self::Memory(_) | Self::File(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.store().backend_name()
    }
}

/// Builds the backend described by `config`.
///
/// For the file backend the log is replayed before this returns, so the
/// store is complete before it serves any read.
///
/// # Errors
///
/// Returns [`StoreError::Database`] / [`StoreError::Migration`] if PostgreSQL
/// is unreachable or cannot be migrated, and [`StoreError::CorruptLog`] /
/// [`StoreError::Io`] if the file log cannot be replayed.
pub async fn select_backend(config: &Config) -> Result<Backend, StoreError> {
    let backend = match config.storage_target() {
        StorageTarget::Database(dsn) => {
            Backend::Postgres(Arc::new(connect_postgres(&dsn, config).await?))
        }
        StorageTarget::File(path) => Backend::File(Arc::new(open_file(&path).await?)),
        StorageTarget::Memory => {
            Backend::Memory(Arc::new(MemoryUrlStore::new(UrlTable::default())))
        }
    };

    info!(backend = backend.name(), "Storage backend selected");

    Ok(backend)
}

async fn connect_postgres(dsn: &str, config: &Config) -> Result<PgUrlStore, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(dsn)
        .await?;
    info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(PgUrlStore::new(Arc::new(pool)))
}

async fn open_file(path: &Path) -> Result<FileUrlStore, StoreError> {
    let table = UrlTable::default();
    FileUrlStore::open(path, MemoryUrlStore::new(table)).await
}
