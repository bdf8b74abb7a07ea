//! Sync state directory
//!
//! All bookkeeping files live in the target repository root next to the
//! page files. Only `.metadata.json` and `.revid` are ever committed;
//! the rest is local progress that `finalize` removes.

mod cursor;
mod ledger;
mod metadata;

pub use cursor::CursorState;
pub use ledger::Ledger;
pub use metadata::RepoMetadata;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use wikirev_core::RevisionRecord;

use crate::atomic::atomic_write;
use crate::errors::{io_error_at, serialization_error, Result};

/// Partially or fully built catalog, in append (then sorted) order
pub const CATALOG_FILE: &str = ".catalog.json";
/// Cached page list of the last filtered listing
pub const PAGES_FILE: &str = ".pages.json";
/// Replay position plus the fingerprint of the catalog it indexes
pub const CURSOR_FILE: &str = ".cursor.json";
/// Newline separated ids of every revision already committed
pub const LEDGER_FILE: &str = ".fetched.txt";
/// Filter memory and tracker state, committed with every step
pub const METADATA_FILE: &str = ".metadata.json";
/// Id of the revision the current commit replays
pub const SENTINEL_FILE: &str = ".revid";

/// Files `finalize` deletes once a run drained its catalog
pub const TRANSIENT_FILES: [&str; 3] = [CURSOR_FILE, CATALOG_FILE, PAGES_FILE];

/// Handle to the state files of one target
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    pub fn exists(&self, file: &str) -> bool {
        self.path(file).is_file()
    }

    /// Load the persisted catalog, if any
    pub fn load_catalog(&self) -> Result<Option<Vec<RevisionRecord>>> {
        self.load_json(CATALOG_FILE)
    }

    /// Persist the catalog in its current order
    pub fn save_catalog(&self, entries: &[RevisionRecord]) -> Result<()> {
        self.save_json(CATALOG_FILE, &entries)
    }

    /// Load the cached page list, if any
    pub fn load_pages(&self) -> Result<Option<Vec<String>>> {
        self.load_json(PAGES_FILE)
    }

    pub fn save_pages(&self, pages: &[String]) -> Result<()> {
        self.save_json(PAGES_FILE, &pages)
    }

    pub fn load_cursor(&self) -> Result<Option<CursorState>> {
        self.load_json(CURSOR_FILE)
    }

    pub fn save_cursor(&self, cursor: &CursorState) -> Result<()> {
        self.save_json(CURSOR_FILE, cursor)
    }

    pub fn load_metadata(&self) -> Result<Option<RepoMetadata>> {
        self.load_json(METADATA_FILE)
    }

    /// Serialize the metadata blob deterministically
    ///
    /// Returned as text so the caller can write it through the target and
    /// stage it in the same commit as the page file.
    pub fn render_metadata(&self, metadata: &RepoMetadata) -> Result<String> {
        let path = self.path(METADATA_FILE);
        let mut json = serde_json::to_string_pretty(metadata)
            .map_err(|e| serialization_error("render_metadata", &path, e))?;
        json.push('\n');
        Ok(json)
    }

    /// Open the revision ledger
    pub fn ledger(&self) -> Result<Ledger> {
        Ledger::open(self.path(LEDGER_FILE))
    }

    /// Entries in the ledger, read without repairing it
    pub fn ledger_len(&self) -> Result<usize> {
        Ledger::count(&self.path(LEDGER_FILE))
    }

    /// Delete the files listed in `TRANSIENT_FILES`
    ///
    /// Returns the names that were actually present.
    pub fn remove_transient(&self) -> Result<Vec<&'static str>> {
        let mut removed = Vec::new();
        for file in TRANSIENT_FILES {
            let path = self.path(file);
            match fs::remove_file(&path) {
                Ok(()) => removed.push(file),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error_at("remove_state_file", &path, e)),
            }
        }
        debug!(removed = ?removed, "Removed transient state files");
        Ok(removed)
    }

    fn load_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error_at("load_state_file", &path, e)),
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| serialization_error("load_state_file", &path, e))?;
        Ok(Some(value))
    }

    fn save_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.path(file);
        let json = serde_json::to_vec(value)
            .map_err(|e| serialization_error("save_state_file", &path, e))?;
        atomic_write(&path, &json)
    }
}
