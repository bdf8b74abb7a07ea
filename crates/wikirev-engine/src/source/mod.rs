//! Remote wiki collaborator
//!
//! The engine only needs a handful of read operations from the wiki. Retry
//! and rate limiting belong to the implementation, not to the engine.

mod dump;

pub use dump::{DumpPage, DumpRevision, DumpSource, SiteDump};

use wikirev_core::{PageFilter, RemoteRevision, RevisionDetails};
use wikirev_store::errors::Result;

/// Read access to a remote wiki
///
/// `Sync` so the catalog builder can fan page fetches out over a worker
/// pool.
pub trait WikiSource: Sync {
    /// Site name, used as the domain of synthesized author addresses
    fn site_name(&self) -> &str;

    /// Names of pages matching `filter`, at most `limit`
    fn list_pages(&self, filter: &PageFilter, limit: usize) -> Result<Vec<String>>;

    /// Resolve a page name to its stable id; `None` when the page is gone
    fn page_id(&self, page_name: &str) -> Result<Option<String>>;

    /// At most `depth` of the page's most recent revisions, oldest first
    fn revisions(&self, page_id: &str, depth: usize) -> Result<Vec<RemoteRevision>>;

    /// Full source text of a revision
    fn revision_source(&self, revision_id: &str) -> Result<String>;

    /// Title and page name as of a revision
    fn revision_details(&self, revision_id: &str) -> Result<RevisionDetails>;

    /// Tag set of `revision_id` obtained by diffing it with `other_revision_id`
    fn tags_from_diff(&self, revision_id: &str, other_revision_id: &str) -> Result<Vec<String>>;

    /// Current tags of a page
    fn page_tags(&self, page_name: &str) -> Result<Vec<String>>;
}
