//! Snapshot commit driver with boundary logging.
//!
//! `SyncSession` replays a sealed catalog into a git target one revision
//! per `step`. Each step writes the page file, the metadata blob and the
//! sentinel, commits them under the revision's author and time, then
//! appends the ledger and advances the cursor, in that order. A crash at
//! any point is repaired by the next `open`:
//! - uncommitted working-tree changes are reset to HEAD
//! - a commit whose ledger append was lost is recovered from the
//!   `last_revision` of the committed metadata blob
//! - a revision already in the ledger is skipped, never committed twice
//!
//! ## Logging Ownership
//!
//! `open_target`, `step` and `finalize` emit lifecycle events.

#![allow(clippy::result_large_err)]

use std::path::Path;

use tracing::{debug, warn};
use wikirev_core::errors::{ExError, ExErrorKind, WikiRevError};
use wikirev_core::message::{commit_message, Author, Lifecycle};
use wikirev_core::naming::page_file_name;
use wikirev_core::target_file::{rewrite_parent_line, TargetFile};
use wikirev_core::{log_op_end, log_op_error, log_op_start};
use wikirev_core::{Catalog, PageFilter, PageIndex, RevisionRecord, StepPlan, TagSource};
use wikirev_core_types::RunId;
use wikirev_store::errors::Result;
use wikirev_store::state::{LEDGER_FILE, METADATA_FILE, SENTINEL_FILE};
use wikirev_store::{CursorState, GitTarget, Ledger, RepoMetadata, StateDir};

use crate::source::WikiSource;

/// Message of the first commit of a new target
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial creation of repo";
/// Message of the closing commit that records the ledger
pub const LEDGER_COMMIT_MESSAGE: &str = "Updating fetched revisions";

/// Options for opening a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Filter recorded in the metadata blob
    pub filter: PageFilter,
    /// Write the `.revid` sentinel with every commit
    pub store_revision_ids: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            filter: PageFilter::default(),
            store_revision_ids: true,
        }
    }
}

/// Result of one `step`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The revision at `index` was committed
    Committed {
        index: usize,
        revision_id: String,
        message: String,
    },
    /// The revision at `index` was already committed by an earlier run
    Skipped { index: usize, revision_id: String },
    /// The cursor reached the end of the catalog
    Exhausted,
}

impl StepOutcome {
    pub fn has_more(&self) -> bool {
        !matches!(self, StepOutcome::Exhausted)
    }
}

/// What `finalize` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub steps_executed: usize,
    /// State files that were removed
    pub removed: Vec<&'static str>,
    pub ledger_committed: bool,
}

/// One replay of a catalog into a target
pub struct SyncSession<'a, S: WikiSource + ?Sized> {
    source: &'a S,
    target: GitTarget,
    state: StateDir,
    catalog: Catalog,
    index: PageIndex,
    ledger: Ledger,
    metadata: RepoMetadata,
    cursor: usize,
    fingerprint: String,
    store_revision_ids: bool,
    steps_executed: usize,
    /// Set while a step has written to the target but not yet committed
    poisoned: bool,
    run_id: RunId,
}

impl<'a, S: WikiSource + ?Sized> SyncSession<'a, S> {
    /// Open (or create) the target at `root` for replaying `catalog`
    ///
    /// ## Errors
    ///
    /// - `Internal`: `catalog` is not sealed
    /// - `CatalogMismatch`: the saved cursor lies beyond the catalog
    /// - `VersionControl` / `Io` / `Serialization`: target or state unusable
    pub fn open(
        source: &'a S,
        root: &Path,
        catalog: Catalog,
        options: SessionOptions,
    ) -> Result<Self> {
        let run_id = RunId::new();
        log_op_start!("open_target", root = %root.display(), run_id = %run_id);
        let start = std::time::Instant::now();

        let session = Self::open_impl(source, root, catalog, options, run_id.clone()).map_err(|e| {
            let e = e.with_run_id(run_id.clone());
            log_op_error!(
                "open_target",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "open_target",
            duration_ms = start.elapsed().as_millis() as u64,
            cursor = session.cursor,
            catalog_len = session.catalog.len(),
            ledger_len = session.ledger.len()
        );

        Ok(session)
    }

    fn open_impl(
        source: &'a S,
        root: &Path,
        catalog: Catalog,
        options: SessionOptions,
        run_id: RunId,
    ) -> Result<Self> {
        let index = catalog.index()?;
        let (target, created) = GitTarget::open_or_init(root)?;
        let state = StateDir::new(target.root());

        if created {
            if options.store_revision_ids {
                target.write(SENTINEL_FILE, "")?;
                target.stage(&[SENTINEL_FILE])?;
                target.commit_as_tool(INITIAL_COMMIT_MESSAGE)?;
            }
        } else {
            target.restore_head(&[LEDGER_FILE])?;
        }

        let mut ledger = state.ledger()?;
        let mut metadata = state.load_metadata()?.unwrap_or_default();
        if let Some(last) = metadata.last_revision.as_deref() {
            if ledger.append(last)? {
                warn!(
                    revision_id = last,
                    "Recovered ledger entry of the last committed revision"
                );
            }
        }
        metadata.filter = options.filter;

        let fingerprint = catalog.fingerprint();
        let cursor = match state.load_cursor()? {
            Some(saved) if saved.matches(&fingerprint) => {
                if saved.cursor > catalog.len() {
                    return Err(WikiRevError::CursorOutOfRange {
                        cursor: saved.cursor,
                        len: catalog.len(),
                    }
                    .into());
                }
                saved.cursor
            }
            Some(_) => {
                warn!("Catalog changed since the cursor was saved, replaying from the start");
                0
            }
            None => 0,
        };
        state.save_cursor(&CursorState::new(cursor, fingerprint.clone()))?;

        Ok(Self {
            source,
            target,
            state,
            catalog,
            index,
            ledger,
            metadata,
            cursor,
            fingerprint,
            store_revision_ids: options.store_revision_ids,
            steps_executed: 0,
            poisoned: false,
            run_id,
        })
    }

    /// Index of the next catalog entry
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn metadata(&self) -> &RepoMetadata {
        &self.metadata
    }

    pub fn target(&self) -> &GitTarget {
        &self.target
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Catalog entries not yet processed
    pub fn remaining(&self) -> usize {
        self.catalog.len().saturating_sub(self.cursor)
    }

    pub fn steps_executed(&self) -> usize {
        self.steps_executed
    }

    /// Process the catalog entry at the cursor
    ///
    /// ## Errors
    ///
    /// - `InvariantViolation`: a child page lost its `parent:` line
    /// - any source error (nothing has been written yet; the step may be
    ///   retried)
    /// - `Internal`: an earlier step failed after writing; the session
    ///   must be reopened, which resets the target to its last commit
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.poisoned {
            return Err(ExError::new(ExErrorKind::Internal)
                .with_op("step")
                .with_run_id(self.run_id.clone())
                .with_message("a previous step failed mid-write; reopen the target"));
        }
        let Some(record) = self.catalog.get(self.cursor).cloned() else {
            return Ok(StepOutcome::Exhausted);
        };

        log_op_start!(
            "step",
            cursor = self.cursor,
            revision_id = %record.revision_id,
            page = %record.page_name
        );
        let start = std::time::Instant::now();

        let outcome = self.step_impl(&record).map_err(|e| {
            let e = e
                .with_revision_id(record.revision_id.clone())
                .with_run_id(self.run_id.clone());
            log_op_error!(
                "step",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "step",
            duration_ms = start.elapsed().as_millis() as u64,
            cursor = self.cursor
        );

        Ok(outcome)
    }

    fn step_impl(&mut self, record: &RevisionRecord) -> Result<StepOutcome> {
        let index = self.cursor;
        if self.ledger.contains(&record.revision_id) {
            debug!(revision_id = %record.revision_id, "Already committed, skipping");
            self.advance()?;
            return Ok(StepOutcome::Skipped {
                index,
                revision_id: record.revision_id.clone(),
            });
        }

        let details = self.source.revision_details(&record.revision_id)?;
        let body = self.source.revision_source(&record.revision_id)?;
        let tags = match self.index.tag_source(record) {
            TagSource::Diff { other_revision_id } => self
                .source
                .tags_from_diff(&record.revision_id, &other_revision_id)?,
            TagSource::Scrape => self.source.page_tags(&record.page_name)?,
        };

        let plan = self.metadata.pages.plan(record, &details);
        let file = page_file_name(&plan.name)?;
        let cascade = self.prepare_cascade(&plan)?;

        self.poisoned = true;
        let lifecycle = self.apply_naming(record, &plan, &file)?;

        let mut staged = Vec::with_capacity(cascade.len() + 3);
        for (child_file, content) in cascade {
            self.target.write(&child_file, &content)?;
            staged.push(child_file);
        }

        let page = TargetFile {
            title: details.title.clone(),
            tags,
            parent: plan.parent.clone(),
            body,
        };
        self.target.write(&file, &page.render())?;
        staged.push(file);

        self.metadata.pages.record(&record.page_id, &plan);
        self.metadata.last_revision = Some(record.revision_id.clone());
        let blob = self.state.render_metadata(&self.metadata)?;
        self.target.write(METADATA_FILE, &blob)?;
        staged.push(METADATA_FILE.to_string());

        if self.store_revision_ids {
            self.target.write(SENTINEL_FILE, &record.revision_id)?;
            staged.push(SENTINEL_FILE.to_string());
        }

        let message = commit_message(&lifecycle, &plan.name, &record.comment);
        let author = Author::for_revision(record, self.source.site_name());
        let paths: Vec<&str> = staged.iter().map(String::as_str).collect();
        self.target.stage(&paths)?;
        self.target.commit(&message, &author)?;
        self.poisoned = false;
        debug!(
            revision_id = %record.revision_id,
            page = %plan.name,
            date = %record.timestamp().map(|t| t.to_rfc3339()).unwrap_or_default(),
            "Committed revision"
        );

        self.ledger.append(&record.revision_id)?;
        self.steps_executed += 1;
        self.advance()?;

        Ok(StepOutcome::Committed {
            index,
            revision_id: record.revision_id.clone(),
            message,
        })
    }

    /// Patched content of every child file a rename has to touch
    ///
    /// Computed before anything is written so a diverged child aborts
    /// the step with the target untouched.
    fn prepare_cascade(&self, plan: &StepPlan) -> Result<Vec<(String, String)>> {
        let Some((from, to)) = plan.rename() else {
            return Ok(Vec::new());
        };
        let mut patched = Vec::with_capacity(plan.children.len());
        for child in &plan.children {
            let child_file = page_file_name(&child.name)?;
            if !self.target.exists(&child_file) {
                return Err(WikiRevError::ParentLineMissing {
                    child: child.name.clone(),
                    expected_parent: from.to_string(),
                }
                .into());
            }
            let content = self.target.read(&child_file)?;
            let content = rewrite_parent_line(&content, &child.name, from, to)?;
            patched.push((child_file, content));
        }
        Ok(patched)
    }

    /// Move the page file on a rename and pick the message verb
    fn apply_naming(&self, record: &RevisionRecord, plan: &StepPlan, file: &str) -> Result<Lifecycle> {
        if let Some((from, to)) = plan.rename() {
            let from_file = page_file_name(from)?;
            if self.target.exists(&from_file) {
                self.target.rename(&from_file, file)?;
                return Ok(Lifecycle::Renamed {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            warn!(
                page_id = %record.page_id,
                from = from,
                to = to,
                "Rename source file is missing, skipping the move"
            );
            return Ok(Lifecycle::Edited);
        }

        if plan.first_seen || !self.target.exists(file) {
            Ok(Lifecycle::Created)
        } else if record.comment.is_empty() {
            Ok(Lifecycle::Updated)
        } else {
            Ok(Lifecycle::Edited)
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.cursor += 1;
        self.state
            .save_cursor(&CursorState::new(self.cursor, self.fingerprint.clone()))
    }

    /// Close a drained run
    ///
    /// Removes the cursor, catalog and page-list files. The ledger is kept
    /// for later incremental runs and committed when it holds revisions
    /// the last commit does not record.
    ///
    /// ## Errors
    ///
    /// - `NotDrained`: catalog entries remain
    pub fn finalize(self) -> Result<FinalizeReport> {
        log_op_start!("finalize", run_id = %self.run_id);
        let start = std::time::Instant::now();

        let report = self.finalize_impl().map_err(|e| {
            log_op_error!(
                "finalize",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "finalize",
            duration_ms = start.elapsed().as_millis() as u64,
            steps_executed = report.steps_executed,
            ledger_committed = report.ledger_committed
        );

        Ok(report)
    }

    fn finalize_impl(&self) -> Result<FinalizeReport> {
        if self.cursor < self.catalog.len() {
            return Err(ExError::new(ExErrorKind::NotDrained)
                .with_op("finalize")
                .with_run_id(self.run_id.clone())
                .with_message(format!(
                    "{} of {} catalog entries processed",
                    self.cursor,
                    self.catalog.len()
                )));
        }

        let removed = self.state.remove_transient()?;

        let mut ledger_committed = false;
        if !self.ledger.is_empty() {
            let current = self.target.read(LEDGER_FILE)?;
            let committed = if self.target.has_commits() {
                self.target.file_at("HEAD", LEDGER_FILE)?
            } else {
                None
            };
            if committed.as_deref() != Some(current.as_str()) {
                self.target.stage(&[LEDGER_FILE])?;
                self.target.commit_as_tool(LEDGER_COMMIT_MESSAGE)?;
                ledger_committed = true;
            }
        }

        Ok(FinalizeReport {
            steps_executed: self.steps_executed,
            removed,
            ledger_committed,
        })
    }
}
