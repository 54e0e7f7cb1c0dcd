//! Error type shared by every storage backend.

use thiserror::Error;

/// Errors surfaced by the store layer.
///
/// `NotFound`, `Deleted` and `Conflict` are outcomes callers are expected to
/// branch on; everything else is an opaque backend failure that is propagated
/// as-is and never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The token never existed.
    #[error("short url `{short_url}` not found")]
    NotFound { short_url: String },

    /// The token existed but has been withdrawn by its owner.
    #[error("short url `{short_url}` has been deleted")]
    Deleted { short_url: String },

    /// The original URL is already shortened; carries the canonical token.
    #[error("original url already shortened as `{short_url}`")]
    Conflict { short_url: String },

    /// The selected backend lacks an optional capability.
    #[error("{capability} is not supported by the {backend} backend")]
    Unsupported {
        capability: &'static str,
        backend: &'static str,
    },

    #[error("batch contains no urls")]
    EmptyBatch,

    /// A log line could not be decoded during replay.
    #[error("malformed storage log entry at line {line}: {source}")]
    CorruptLog {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("storage log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(short_url: impl Into<String>) -> Self {
        Self::NotFound {
            short_url: short_url.into(),
        }
    }

    pub fn deleted(short_url: impl Into<String>) -> Self {
        Self::Deleted {
            short_url: short_url.into(),
        }
    }

    pub fn conflict(short_url: impl Into<String>) -> Self {
        Self::Conflict {
            short_url: short_url.into(),
        }
    }

    pub fn unsupported(capability: &'static str, backend: &'static str) -> Self {
        Self::Unsupported {
            capability,
            backend,
        }
    }

    /// Returns the canonical token when this is a [`StoreError::Conflict`].
    pub fn conflicting_short_url(&self) -> Option<&str> {
        match self {
            Self::Conflict { short_url } => Some(short_url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_exposes_existing_token() {
        let err = StoreError::conflict("AbCd1234");

        assert_eq!(err.conflicting_short_url(), Some("AbCd1234"));
        assert!(err.to_string().contains("AbCd1234"));
    }

    #[test]
    fn test_non_conflict_has_no_token() {
        assert!(StoreError::not_found("x").conflicting_short_url().is_none());
        assert!(StoreError::deleted("x").conflicting_short_url().is_none());
    }

    #[test]
    fn test_unsupported_message_names_backend() {
        let err = StoreError::unsupported("ping", "memory");
        assert_eq!(err.to_string(), "ping is not supported by the memory backend");
    }

    #[test]
    fn test_corrupt_log_reports_line() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = StoreError::CorruptLog { line: 7, source };

        assert!(err.to_string().starts_with("malformed storage log entry at line 7"));
    }
}
