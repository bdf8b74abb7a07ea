//! Revision catalog builder with boundary logging.
//!
//! Builds the date-ordered catalog of every revision of the selected pages.
//! Page fetches run on a bounded worker pool; results are applied in page
//! input order by a single collector, which persists the catalog after
//! every page so an interrupted build resumes where it stopped.
//!
//! ## Logging Ownership
//!
//! - `log_op_start!` / `log_op_end!` / `log_op_error!` around the build
//! - `warn!` for each page that is gone or failed to fetch

#![allow(clippy::result_large_err)]

use std::collections::{BTreeMap, HashSet};
use std::thread;

use crossbeam::channel;
use tracing::{debug, warn};
use wikirev_core::errors::{ExError, ExErrorKind};
use wikirev_core::{log_op_end, log_op_error, log_op_start};
use wikirev_core::{Catalog, PageFilter, PageSelector, RevisionRecord};
use wikirev_store::errors::Result;
use wikirev_store::{Ledger, StateDir};

use crate::config::SyncConfig;
use crate::source::WikiSource;

/// Most pages a filtered listing may return
pub const PAGE_LIST_LIMIT: usize = 10_000;

/// What to put into the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub selector: PageSelector,
    /// Maximum revisions fetched per page
    pub depth: usize,
    /// Size of the fetch worker pool
    pub workers: usize,
    /// Page names that are never fetched
    pub denylist: Vec<String>,
}

impl CatalogRequest {
    /// Request for explicit `pages`, or for the configured filter when empty
    pub fn from_config(config: &SyncConfig, pages: Vec<String>) -> Self {
        let selector = if pages.is_empty() {
            PageSelector::Filter(config.filter())
        } else {
            PageSelector::Pages(pages)
        };
        Self {
            selector,
            depth: config.depth,
            workers: config.workers(),
            denylist: config.denylist.clone(),
        }
    }
}

/// Counters of one catalog build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    /// Filter in effect after falling back to the remembered one
    pub filter: PageFilter,
    pub pages_selected: usize,
    pub pages_denied: usize,
    /// Already represented in a resumed catalog
    pub pages_already_fetched: usize,
    pub pages_fetched: usize,
    pub pages_gone: usize,
    /// Left for the next invocation to retry
    pub pages_failed: usize,
    pub revisions_added: usize,
    /// Skipped because a previous run already committed them
    pub revisions_already_committed: usize,
    pub catalog_len: usize,
}

/// Build (or resume building) the catalog in `state`
///
/// The returned catalog is sealed.
///
/// ## Errors
///
/// - `Io` / `Serialization`: state files unreadable or unwritable
/// - Any error from listing pages (without a page list there is nothing
///   to build)
///
/// Failures of individual pages are not errors; see `CatalogReport`.
pub fn build_catalog<S: WikiSource + ?Sized>(
    source: &S,
    state: &StateDir,
    request: &CatalogRequest,
) -> Result<(Catalog, CatalogReport)> {
    log_op_start!("build_catalog", workers = request.workers, depth = request.depth);
    let start = std::time::Instant::now();

    let result = build_catalog_impl(source, state, request).map_err(|e| {
        log_op_error!(
            "build_catalog",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "build_catalog",
        duration_ms = start.elapsed().as_millis() as u64,
        catalog_len = result.1.catalog_len,
        pages_fetched = result.1.pages_fetched,
        pages_failed = result.1.pages_failed
    );

    Ok(result)
}

fn build_catalog_impl<S: WikiSource + ?Sized>(
    source: &S,
    state: &StateDir,
    request: &CatalogRequest,
) -> Result<(Catalog, CatalogReport)> {
    let remembered = state
        .load_metadata()?
        .map(|metadata| metadata.filter)
        .unwrap_or_default();

    let (names, filter) = match &request.selector {
        PageSelector::Pages(pages) => (pages.clone(), remembered),
        PageSelector::Filter(given) => {
            let filter = given.clone().or_remembered(&remembered);
            let names = match state.load_pages()? {
                Some(cached) => {
                    debug!(pages = cached.len(), "Using cached page list");
                    cached
                }
                None => {
                    let listed = source.list_pages(&filter, PAGE_LIST_LIMIT)?;
                    state.save_pages(&listed)?;
                    listed
                }
            };
            (names, filter)
        }
    };

    let mut catalog = Catalog::from_entries(state.load_catalog()?.unwrap_or_default());
    let ledger = state.ledger()?;
    let fetched = catalog.fetched_pages();

    let mut report = CatalogReport {
        filter,
        ..Default::default()
    };
    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    for name in names {
        if !seen.insert(name.clone()) {
            continue;
        }
        report.pages_selected += 1;
        if request.denylist.contains(&name) {
            report.pages_denied += 1;
        } else if fetched.contains(&name) {
            report.pages_already_fetched += 1;
        } else {
            pending.push(name);
        }
    }
    debug!(
        pending = pending.len(),
        already_fetched = report.pages_already_fetched,
        "Fetching pages"
    );

    fetch_pages(source, &pending, request.depth, request.workers, |name, fetch| {
        apply_fetch(&mut catalog, &ledger, state, &mut report, name, fetch)
    })?;

    catalog.seal();
    state.save_catalog(catalog.entries())?;
    report.catalog_len = catalog.len();

    Ok((catalog, report))
}

/// Result of fetching one page's revision list
enum PageFetch {
    Fetched(Vec<RevisionRecord>),
    Gone,
    Failed(ExError),
}

fn fetch_page<S: WikiSource + ?Sized>(source: &S, name: &str, depth: usize) -> PageFetch {
    let page_id = match source.page_id(name) {
        Ok(Some(page_id)) => page_id,
        Ok(None) => return PageFetch::Gone,
        Err(e) if e.kind() == ExErrorKind::PageGone => return PageFetch::Gone,
        Err(e) => return PageFetch::Failed(e.with_page(name)),
    };
    match source.revisions(&page_id, depth) {
        Ok(revisions) => PageFetch::Fetched(
            revisions
                .into_iter()
                .map(|remote| RevisionRecord::from_remote(&page_id, name, remote))
                .collect(),
        ),
        Err(e) if e.kind() == ExErrorKind::PageGone => PageFetch::Gone,
        Err(e) => PageFetch::Failed(e.with_page(name)),
    }
}

/// Fetch `pages` on up to `workers` threads, handing each result to
/// `apply` in the order of `pages`
///
/// An error from `apply` stops the pool after in-flight fetches finish.
fn fetch_pages<S, F>(source: &S, pages: &[String], depth: usize, workers: usize, mut apply: F) -> Result<()>
where
    S: WikiSource + ?Sized,
    F: FnMut(&str, PageFetch) -> Result<()>,
{
    if pages.is_empty() {
        return Ok(());
    }
    let workers = workers.clamp(1, pages.len());

    let (job_tx, job_rx) = channel::unbounded::<usize>();
    let (done_tx, done_rx) = channel::unbounded::<(usize, PageFetch)>();
    for index in 0..pages.len() {
        job_tx
            .send(index)
            .map_err(|_| internal_error("queue_page_fetch"))?;
    }
    drop(job_tx);

    thread::scope(move |scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                for index in job_rx.iter() {
                    let fetch = fetch_page(source, &pages[index], depth);
                    if done_tx.send((index, fetch)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);

        let mut parked: BTreeMap<usize, PageFetch> = BTreeMap::new();
        let mut next = 0;
        for (index, fetch) in done_rx.iter() {
            parked.insert(index, fetch);
            while let Some(fetch) = parked.remove(&next) {
                apply(&pages[next], fetch)?;
                next += 1;
            }
        }

        if next != pages.len() {
            return Err(internal_error("collect_page_fetch"));
        }
        Ok(())
    })
}

fn apply_fetch(
    catalog: &mut Catalog,
    ledger: &Ledger,
    state: &StateDir,
    report: &mut CatalogReport,
    name: &str,
    fetch: PageFetch,
) -> Result<()> {
    match fetch {
        PageFetch::Fetched(records) => {
            report.pages_fetched += 1;
            for record in records {
                if ledger.contains(&record.revision_id) {
                    report.revisions_already_committed += 1;
                    continue;
                }
                if catalog.append(record)? {
                    report.revisions_added += 1;
                }
            }
            state.save_catalog(catalog.entries())?;
        }
        PageFetch::Gone => {
            warn!(page = name, "Page no longer exists, skipping");
            report.pages_gone += 1;
        }
        PageFetch::Failed(err) => {
            warn!(
                page = name,
                err_code = err.code(),
                error = %err,
                "Failed to fetch page, it will be retried on the next build"
            );
            report.pages_failed += 1;
        }
    }
    Ok(())
}

fn internal_error(op: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(op)
        .with_message("page fetch worker pool stopped early")
}
