//! URL record entity exchanged between every store backend.

/// A short token mapped to its original URL, owned by an anonymous identity.
///
/// `deleted` is a visibility flag: records are never physically removed,
/// they are only withdrawn by the delete worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub short_url: String,
    pub original_url: String,
    pub user_id: String,
    pub deleted: bool,
}

impl UrlRecord {
    /// Creates a live (not deleted) record.
    pub fn new(
        short_url: impl Into<String>,
        original_url: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            short_url: short_url.into(),
            original_url: original_url.into(),
            user_id: user_id.into(),
            deleted: false,
        }
    }

    /// Returns true if the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}
