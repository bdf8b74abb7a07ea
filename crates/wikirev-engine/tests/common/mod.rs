// Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use wikirev_core::errors::{ExError, ExErrorKind};
use wikirev_core::{PageFilter, PageSelector, RemoteRevision, RevisionDetails};
use wikirev_engine::source::{DumpPage, DumpRevision, SiteDump};
use wikirev_engine::{
    build_catalog, CatalogRequest, DumpSource, FinalizeReport, SessionOptions, StepOutcome,
    SyncSession, WikiSource,
};
use wikirev_store::errors::Result;
use wikirev_store::{CommitSummary, GitTarget, StateDir};

pub const SITE: &str = "test-wiki";

/// Builds a `SiteDump` page by page
#[derive(Clone)]
pub struct DumpBuilder {
    dump: SiteDump,
}

impl DumpBuilder {
    pub fn new() -> Self {
        Self {
            dump: SiteDump {
                site: SITE.to_string(),
                pages: Vec::new(),
            },
        }
    }

    /// Add a page; `name` is its current name
    pub fn page(mut self, name: &str, id: &str) -> Self {
        self.dump.pages.push(DumpPage {
            name: name.to_string(),
            id: Some(id.to_string()),
            created_by: Some("alice".to_string()),
            ..Default::default()
        });
        self
    }

    /// Add a page that is listed but no longer resolves
    pub fn gone_page(mut self, name: &str) -> Self {
        self.dump.pages.push(DumpPage {
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn live_tags(mut self, page: &str, tags: &[&str]) -> Self {
        self.page_mut(page).tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Add a revision named like the page's current name
    pub fn rev(self, page: &str, id: &str, date: i64, comment: &str) -> Self {
        self.rev_named(page, page, id, date, comment)
    }

    /// Add a revision made while the page was called `unixname`
    pub fn rev_named(self, page: &str, unixname: &str, id: &str, date: i64, comment: &str) -> Self {
        self.rev_with(
            page,
            DumpRevision {
                id: id.to_string(),
                flag: "S".to_string(),
                date,
                user: "alice".to_string(),
                comment: comment.to_string(),
                source: format!("{} at r{}\n", unixname, id),
                title: None,
                unixname: Some(unixname.to_string()),
                tags: Vec::new(),
            },
        )
    }

    pub fn rev_with(mut self, page: &str, revision: DumpRevision) -> Self {
        self.page_mut(page).revisions.push(revision);
        self
    }

    pub fn dump(&self) -> SiteDump {
        self.dump.clone()
    }

    pub fn build(self) -> DumpSource {
        DumpSource::new(self.dump)
    }

    fn page_mut(&mut self, name: &str) -> &mut DumpPage {
        let idx = self
            .dump
            .pages
            .iter()
            .position(|p| p.name == name)
            .unwrap_or_else(|| panic!("page {} not added", name));
        &mut self.dump.pages[idx]
    }
}

/// Request covering every page of the source
pub fn all_pages(workers: usize) -> CatalogRequest {
    CatalogRequest {
        selector: PageSelector::Filter(PageFilter::default()),
        depth: 10_000,
        workers,
        denylist: vec!["sandbox".to_string()],
    }
}

/// Build the catalog in `root` and open a session on it
pub fn open<'a, S: WikiSource + ?Sized>(source: &'a S, root: &Path) -> SyncSession<'a, S> {
    let state = StateDir::new(root);
    let (catalog, report) = build_catalog(source, &state, &all_pages(1)).unwrap();
    let options = SessionOptions {
        filter: report.filter,
        ..Default::default()
    };
    SyncSession::open(source, root, catalog, options).unwrap()
}

/// Step until exhausted
pub fn drain<S: WikiSource + ?Sized>(session: &mut SyncSession<'_, S>) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    loop {
        let outcome = session.step().unwrap();
        if !outcome.has_more() {
            return outcomes;
        }
        outcomes.push(outcome);
    }
}

/// build → open → step* → finalize
pub fn run_full<S: WikiSource + ?Sized>(source: &S, root: &Path) -> (Vec<StepOutcome>, FinalizeReport) {
    let mut session = open(source, root);
    let outcomes = drain(&mut session);
    let report = session.finalize().unwrap();
    (outcomes, report)
}

pub fn history(root: &Path) -> Vec<CommitSummary> {
    let (target, _) = GitTarget::open_or_init(root).unwrap();
    target.history().unwrap()
}

pub fn messages(root: &Path) -> Vec<String> {
    history(root).into_iter().map(|c| c.message).collect()
}

pub fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

/// `WikiSource` wrapper that fails chosen pages and counts lookups
pub struct FlakySource {
    inner: DumpSource,
    failing: Vec<String>,
    pub looked_up: Mutex<Vec<String>>,
}

impl FlakySource {
    pub fn new(inner: DumpSource, failing: &[&str]) -> Self {
        Self {
            inner,
            failing: failing.iter().map(|p| p.to_string()).collect(),
            looked_up: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        let mut pages = self.looked_up.lock().unwrap().clone();
        pages.sort();
        pages
    }
}

impl WikiSource for FlakySource {
    fn site_name(&self) -> &str {
        self.inner.site_name()
    }

    fn list_pages(&self, filter: &PageFilter, limit: usize) -> Result<Vec<String>> {
        self.inner.list_pages(filter, limit)
    }

    fn page_id(&self, page_name: &str) -> Result<Option<String>> {
        self.looked_up.lock().unwrap().push(page_name.to_string());
        if self.failing.iter().any(|p| p == page_name) {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("page_id")
                .with_message("503 Service Unavailable"));
        }
        self.inner.page_id(page_name)
    }

    fn revisions(&self, page_id: &str, depth: usize) -> Result<Vec<RemoteRevision>> {
        self.inner.revisions(page_id, depth)
    }

    fn revision_source(&self, revision_id: &str) -> Result<String> {
        self.inner.revision_source(revision_id)
    }

    fn revision_details(&self, revision_id: &str) -> Result<RevisionDetails> {
        self.inner.revision_details(revision_id)
    }

    fn tags_from_diff(&self, revision_id: &str, other_revision_id: &str) -> Result<Vec<String>> {
        self.inner.tags_from_diff(revision_id, other_revision_id)
    }

    fn page_tags(&self, page_name: &str) -> Result<Vec<String>> {
        self.inner.page_tags(page_name)
    }
}
