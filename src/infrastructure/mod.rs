//! Infrastructure layer for external integrations.
//!
//! This layer implements the store traits defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Memory, file and PostgreSQL backends
//! - [`store_selector`] - Picks one backend from configuration at startup

pub mod persistence;
pub mod store_selector;
