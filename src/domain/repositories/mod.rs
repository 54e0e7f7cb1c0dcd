//! Store trait definitions for the domain layer.
//!
//! Backends implement a base reader/writer pair and opt into extra
//! capabilities. Implementations live in `crate::infrastructure::persistence`.
//!
//! # Traits
//!
//! - [`UrlReader`] / [`UrlWriter`] - Implemented by every backend
//! - [`Pingable`] - Liveness probe (PostgreSQL)
//! - [`UserScoped`] - Per-identity listing and ownership filtering (PostgreSQL)
//! - [`BatchDeletable`] - Bulk soft deletion (PostgreSQL)
//! - [`UrlStore`] - Reader + writer with capability queries

pub mod url_store;

pub use url_store::{BatchDeletable, Pingable, UrlReader, UrlStore, UrlWriter, UserScoped};

#[cfg(test)]
pub use url_store::MockBatchDeletable;
