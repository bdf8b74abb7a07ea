//! JSON site dump source
//!
//! Serves a whole wiki from one JSON document. Used for offline replays
//! and as the fixture source in tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wikirev_core::errors::{ExError, ExErrorKind};
use wikirev_core::{PageFilter, RemoteRevision, RevisionDetails};
use wikirev_store::errors::{io_error_at, Result};

use super::WikiSource;

/// Category of pages whose name has no `category:` prefix
pub const DEFAULT_CATEGORY: &str = "_default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDump {
    pub site: String,
    #[serde(default)]
    pub pages: Vec<DumpPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpPage {
    pub name: String,
    /// `None` for a page that was listed but has since been deleted
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Live tags
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub revisions: Vec<DumpRevision>,
}

impl DumpPage {
    fn category(&self) -> &str {
        match self.category.as_deref() {
            Some(category) => category,
            None => self
                .name
                .split_once(':')
                .map(|(category, _)| category)
                .unwrap_or(DEFAULT_CATEGORY),
        }
    }

    fn matches(&self, filter: &PageFilter) -> bool {
        if !filter.all_categories() && self.category() != filter.category_or_all() {
            return false;
        }
        let wanted = filter.tag_list();
        if !wanted.is_empty() && !wanted.iter().any(|t| self.tags.iter().any(|p| p == t)) {
            return false;
        }
        match filter.created_by.as_deref() {
            Some(creator) => self.created_by.as_deref() == Some(creator),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRevision {
    pub id: String,
    #[serde(default)]
    pub flag: String,
    pub date: i64,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Page name at this revision
    #[serde(default)]
    pub unixname: Option<String>,
    /// Tag set after this revision
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `WikiSource` over an in-memory `SiteDump`
#[derive(Debug, Clone)]
pub struct DumpSource {
    dump: SiteDump,
    by_name: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    /// revision id -> (page index, revision index)
    revisions: HashMap<String, (usize, usize)>,
}

impl DumpSource {
    pub fn new(dump: SiteDump) -> Self {
        let mut by_name = HashMap::new();
        let mut by_id = HashMap::new();
        let mut revisions = HashMap::new();
        for (page_idx, page) in dump.pages.iter().enumerate() {
            by_name.insert(page.name.clone(), page_idx);
            if let Some(id) = &page.id {
                by_id.insert(id.clone(), page_idx);
            }
            for (rev_idx, rev) in page.revisions.iter().enumerate() {
                revisions.insert(rev.id.clone(), (page_idx, rev_idx));
            }
        }
        Self {
            dump,
            by_name,
            by_id,
            revisions,
        }
    }

    /// Read a dump file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| io_error_at("load_dump", path, e))?;
        let dump: SiteDump = serde_json::from_slice(&bytes).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_dump")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::new(dump))
    }

    fn revision(&self, revision_id: &str) -> Result<&DumpRevision> {
        self.revisions
            .get(revision_id)
            .map(|&(page, rev)| &self.dump.pages[page].revisions[rev])
            .ok_or_else(|| {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("fetch_revision")
                    .with_revision_id(revision_id)
                    .with_message("revision not in dump")
            })
    }
}

impl WikiSource for DumpSource {
    fn site_name(&self) -> &str {
        &self.dump.site
    }

    fn list_pages(&self, filter: &PageFilter, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .dump
            .pages
            .iter()
            .filter(|page| page.matches(filter))
            .take(limit)
            .map(|page| page.name.clone())
            .collect())
    }

    fn page_id(&self, page_name: &str) -> Result<Option<String>> {
        Ok(self
            .by_name
            .get(page_name)
            .and_then(|&idx| self.dump.pages[idx].id.clone()))
    }

    fn revisions(&self, page_id: &str, depth: usize) -> Result<Vec<RemoteRevision>> {
        let page = self
            .by_id
            .get(page_id)
            .map(|&idx| &self.dump.pages[idx])
            .ok_or_else(|| {
                ExError::new(ExErrorKind::PageGone)
                    .with_op("list_revisions")
                    .with_message(format!("no page with id {}", page_id))
            })?;

        let mut listed: Vec<&DumpRevision> = page.revisions.iter().collect();
        listed.sort_by_key(|rev| rev.date);
        let skip = listed.len().saturating_sub(depth);
        Ok(listed
            .into_iter()
            .skip(skip)
            .map(|rev| RemoteRevision {
                id: rev.id.clone(),
                flag: rev.flag.clone(),
                date: rev.date,
                user: rev.user.clone(),
                comment: rev.comment.clone(),
            })
            .collect())
    }

    fn revision_source(&self, revision_id: &str) -> Result<String> {
        Ok(self.revision(revision_id)?.source.clone())
    }

    fn revision_details(&self, revision_id: &str) -> Result<RevisionDetails> {
        let rev = self.revision(revision_id)?;
        Ok(RevisionDetails {
            title: rev.title.clone(),
            unixname: rev.unixname.clone(),
        })
    }

    fn tags_from_diff(&self, revision_id: &str, other_revision_id: &str) -> Result<Vec<String>> {
        self.revision(other_revision_id)?;
        Ok(self.revision(revision_id)?.tags.clone())
    }

    fn page_tags(&self, page_name: &str) -> Result<Vec<String>> {
        self.by_name
            .get(page_name)
            .map(|&idx| self.dump.pages[idx].tags.clone())
            .ok_or_else(|| {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("page_tags")
                    .with_page(page_name)
                    .with_message("page not in dump")
            })
    }
}
