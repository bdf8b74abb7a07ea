use serde::{Deserialize, Serialize};
use wikirev_core::{PageFilter, PageTracker};

/// Committed metadata blob (`.metadata.json`)
///
/// Restores the filter a target was created with and the tracker state
/// as of the last committed step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    #[serde(default)]
    pub filter: PageFilter,
    #[serde(default)]
    pub pages: PageTracker,
    /// Revision replayed by the commit holding this blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_revision: Option<String>,
}
