//! Deletion request model for the asynchronous soft-delete pipeline.

use crate::domain::entities::UrlRecord;

/// A deletion accepted for processing but not yet applied.
///
/// Created by [`crate::application::services::UrlService::request_deletion`]
/// after ownership filtering, sent through a
/// [`crate::domain::delete_worker::DeleteQueue`] and held in the worker's
/// buffer until the next flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub short_url: String,
    pub user_id: String,
}

impl PendingDelete {
    pub fn new(short_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            user_id: user_id.into(),
        }
    }
}

impl From<UrlRecord> for PendingDelete {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_url: record.short_url,
            user_id: record.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_delete_from_record() {
        let record = UrlRecord::new("abcd1234", "https://example.com", "user-1");

        let pending = PendingDelete::from(record);

        assert_eq!(pending, PendingDelete::new("abcd1234", "user-1"));
    }
}
