use serde::{Deserialize, Serialize};

/// Replay position within a specific catalog
///
/// The fingerprint pins the cursor to the catalog order it was taken
/// against. A cursor whose fingerprint no longer matches is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    /// Index of the next catalog entry to process
    pub cursor: usize,
    pub catalog_fingerprint: String,
}

impl CursorState {
    pub fn new(cursor: usize, catalog_fingerprint: impl Into<String>) -> Self {
        Self {
            cursor,
            catalog_fingerprint: catalog_fingerprint.into(),
        }
    }

    /// Whether this cursor was taken against a catalog with `fingerprint`
    pub fn matches(&self, fingerprint: &str) -> bool {
        self.catalog_fingerprint == fingerprint
    }
}
