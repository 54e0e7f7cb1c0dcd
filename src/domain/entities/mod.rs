//! Core domain entities.
//!
//! - [`UrlRecord`] - A short token mapped to an original URL

pub mod url_record;

pub use url_record::UrlRecord;
