//! Read-only progress report for a target directory

#![allow(clippy::result_large_err)]

use std::path::Path;

use wikirev_core::{Catalog, PageFilter};
use wikirev_store::errors::Result;
use wikirev_store::{GitTarget, StateDir};

/// Snapshot of a target's sync progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// `None` when no catalog is on disk (no run in progress)
    pub catalog_len: Option<usize>,
    pub cursor: Option<usize>,
    /// The saved cursor was taken against the catalog on disk
    pub cursor_current: bool,
    pub pages_cached: Option<usize>,
    pub ledger_len: usize,
    pub tracked_pages: usize,
    pub filter: PageFilter,
    pub last_revision: Option<String>,
    pub commits: usize,
}

impl SyncStatus {
    /// Catalog entries left to replay
    pub fn remaining(&self) -> Option<usize> {
        let len = self.catalog_len?;
        let cursor = if self.cursor_current {
            self.cursor.unwrap_or(0)
        } else {
            0
        };
        Some(len.saturating_sub(cursor))
    }
}

/// Inspect `root` without modifying it
pub fn status(root: &Path) -> Result<SyncStatus> {
    let state = StateDir::new(root);

    let catalog = state.load_catalog()?.map(Catalog::from_entries);
    let cursor = state.load_cursor()?;
    let cursor_current = match (&catalog, &cursor) {
        (Some(catalog), Some(cursor)) => cursor.matches(&catalog.fingerprint()),
        _ => false,
    };
    let metadata = state.load_metadata()?.unwrap_or_default();

    let commits = if root.join(".git").exists() {
        let (target, _) = GitTarget::open_or_init(root)?;
        target.history()?.len()
    } else {
        0
    };

    Ok(SyncStatus {
        catalog_len: catalog.as_ref().map(Catalog::len),
        cursor: cursor.map(|c| c.cursor),
        cursor_current,
        pages_cached: state.load_pages()?.map(|pages| pages.len()),
        ledger_len: state.ledger_len()?,
        tracked_pages: metadata.pages.len(),
        filter: metadata.filter,
        last_revision: metadata.last_revision,
        commits,
    })
}
