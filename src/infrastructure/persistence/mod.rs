//! Store backend implementations.
//!
//! # Backends
//!
//! - [`MemoryUrlStore`] - Volatile sharded map
//! - [`FileUrlStore`] - Append-only JSON-lines log replayed into a memory table
//! - [`PgUrlStore`] - PostgreSQL with conflict detection and soft deletion

pub mod append_log;
pub mod file_url_store;
pub mod memory_url_store;
pub mod pg_url_store;

pub use file_url_store::FileUrlStore;
pub use memory_url_store::{MemoryUrlStore, UrlTable};
pub use pg_url_store::PgUrlStore;
