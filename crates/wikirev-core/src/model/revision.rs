use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Revision flag the source uses for tag-change events
pub const TAG_CHANGE_FLAG: &str = "A";

/// One revision as listed by the source for a single page
///
/// This is what the remote revision list returns before the catalog
/// attaches page identity to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRevision {
    pub id: String,
    pub flag: String,
    /// Unix epoch seconds
    pub date: i64,
    pub user: String,
    pub comment: String,
}

/// RevisionRecord - one remote edit event in the catalog
///
/// Immutable once fetched. `page_name` is the display name at the time
/// the catalog was built and may differ from the name the page had when
/// the revision was made (see `RevisionDetails::unixname`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Stable remote page identifier
    pub page_id: String,

    /// Page name at catalog build time
    pub page_name: String,

    /// Globally unique across all pages of the source
    pub revision_id: String,

    /// Edit-type tag (`TAG_CHANGE_FLAG` for tag changes)
    pub flag: String,

    /// Unix epoch seconds
    pub date: i64,

    pub user: String,

    /// Free text; may encode a structured event such as a re-parenting
    pub comment: String,
}

impl RevisionRecord {
    /// Attach page identity to a listed revision
    pub fn from_remote(page_id: &str, page_name: &str, remote: RemoteRevision) -> Self {
        Self {
            page_id: page_id.to_string(),
            page_name: page_name.to_string(),
            revision_id: remote.id,
            flag: remote.flag,
            date: remote.date,
            user: remote.user,
            comment: remote.comment,
        }
    }

    /// Whether this revision changed the page's tags
    pub fn is_tag_change(&self) -> bool {
        self.flag == TAG_CHANGE_FLAG
    }

    /// Revision timestamp in UTC, if representable
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }
}

/// Revision-time metadata fetched separately from the revision list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionDetails {
    /// Page title as of this revision
    pub title: Option<String>,
    /// Page name as of this revision
    pub unixname: Option<String>,
}

impl RevisionDetails {
    /// Name the page had at this revision, falling back to the catalog name
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.unixname.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => fallback,
        }
    }
}
