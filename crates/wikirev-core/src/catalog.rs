//! Revision catalog
//!
//! The catalog is the globally time-ordered list of revisions to replay.
//! It grows append-only while pages are fetched, is stable-sorted by date
//! exactly once (`seal`), and never changes order afterwards.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::errors::{Result, WikiRevError};
use crate::model::RevisionRecord;

/// Ordered sequence of revisions spanning all pages in scope
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<RevisionRecord>,
    known: HashSet<String>,
    sealed: bool,
}

impl Catalog {
    /// Create an empty, unsealed catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously persisted (possibly partial) catalog
    ///
    /// Duplicate revision ids in the input are dropped, keeping the first.
    pub fn from_entries(entries: Vec<RevisionRecord>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            if catalog.known.insert(entry.revision_id.clone()) {
                catalog.entries.push(entry);
            }
        }
        catalog
    }

    pub fn entries(&self) -> &[RevisionRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RevisionRecord> {
        self.entries.get(index)
    }

    pub fn contains(&self, revision_id: &str) -> bool {
        self.known.contains(revision_id)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Page names with at least one revision in the catalog
    ///
    /// Only whole pages are tracked; a page whose fetch produced nothing
    /// is absent and will be queried again.
    pub fn fetched_pages(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.page_name.clone()).collect()
    }

    /// Append a revision unless its id is already present
    ///
    /// Returns `Ok(false)` for duplicates.
    pub fn append(&mut self, record: RevisionRecord) -> Result<bool> {
        if self.sealed {
            return Err(WikiRevError::CatalogSealed {
                revision_id: record.revision_id,
            });
        }
        if !self.known.insert(record.revision_id.clone()) {
            return Ok(false);
        }
        self.entries.push(record);
        Ok(true)
    }

    /// Stable sort by date and freeze the order
    ///
    /// Revisions with equal dates keep their discovery order.
    pub fn seal(&mut self) {
        if !self.sealed {
            self.entries.sort_by_key(|e| e.date);
            self.sealed = true;
        }
    }

    /// SHA-256 over the revision id order
    ///
    /// Two catalogs with the same fingerprint replay identically, which is
    /// what makes a saved cursor meaningful.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.revision_id.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    /// Build the per-page index; the catalog must be sealed
    pub fn index(&self) -> Result<PageIndex> {
        if !self.sealed {
            return Err(WikiRevError::CatalogNotSorted);
        }
        Ok(PageIndex::build(&self.entries))
    }

    pub fn into_entries(self) -> Vec<RevisionRecord> {
        self.entries
    }
}

/// Where the tag set of a revision comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSource {
    /// Diff this revision against another revision of the same page
    Diff { other_revision_id: String },
    /// The page has no tag-change revision: use its live tags
    Scrape,
}

#[derive(Debug, Clone, Default)]
struct PageHistory {
    positions: Vec<usize>,
    first_revision: Option<String>,
    first_tag_change: Option<String>,
}

/// Page id to that page's revisions, in catalog (date) order
///
/// Built once after sealing so per-step lookups do not scan the catalog.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    pages: HashMap<String, PageHistory>,
}

impl PageIndex {
    fn build(entries: &[RevisionRecord]) -> Self {
        let mut pages: HashMap<String, PageHistory> = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            let history = pages.entry(entry.page_id.clone()).or_default();
            history.positions.push(position);
            if history.first_revision.is_none() {
                history.first_revision = Some(entry.revision_id.clone());
            }
            if entry.is_tag_change() && history.first_tag_change.is_none() {
                history.first_tag_change = Some(entry.revision_id.clone());
            }
        }
        Self { pages }
    }

    /// Catalog positions of a page's revisions
    pub fn positions(&self, page_id: &str) -> &[usize] {
        self.pages
            .get(page_id)
            .map(|h| h.positions.as_slice())
            .unwrap_or(&[])
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Decide how to resolve the tags of `record`
    ///
    /// A page with a tag-change revision is diffed against its first one;
    /// that first tag-change revision itself is diffed against the page's
    /// first revision.
    pub fn tag_source(&self, record: &RevisionRecord) -> TagSource {
        let Some(history) = self.pages.get(&record.page_id) else {
            return TagSource::Scrape;
        };
        match (&history.first_tag_change, &history.first_revision) {
            (Some(tag_rev), _) if *tag_rev != record.revision_id => TagSource::Diff {
                other_revision_id: tag_rev.clone(),
            },
            (Some(_), Some(first)) => TagSource::Diff {
                other_revision_id: first.clone(),
            },
            _ => TagSource::Scrape,
        }
    }
}
