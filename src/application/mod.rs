//! Application layer services.
//!
//! Services consume the capability traits from [`crate::domain::repositories`]
//! and never know which backend is active. See
//! [`services::url_service::UrlService`].

pub mod services;
