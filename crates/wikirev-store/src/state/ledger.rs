//! Revision ledger
//!
//! One revision id per line. Entries are only ever appended, and each
//! append is synced before it returns, so the ledger never claims a
//! revision that was not yet committed to the target.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::{io_error_at, Result};

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    ids: HashSet<String>,
    order: Vec<String>,
}

impl Ledger {
    /// Open a ledger, treating a missing file as empty
    ///
    /// A torn trailing line (crash mid-append) is cut off.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = read_ledger(&path)?;

        let complete = complete_lines(&content);
        if complete.len() < content.len() {
            warn!(path = %path.display(), "Dropping torn trailing ledger line");
            OpenOptions::new()
                .write(true)
                .open(&path)
                .and_then(|file| file.set_len(complete.len() as u64))
                .map_err(|e| io_error_at("truncate_ledger", &path, e))?;
        }

        let mut ids = HashSet::new();
        let mut order = Vec::new();
        for id in entries(complete) {
            if ids.insert(id.to_string()) {
                order.push(id.to_string());
            }
        }

        Ok(Self { path, ids, order })
    }

    /// Distinct complete entries in the ledger at `path`
    ///
    /// Leaves the file untouched, torn tail included.
    pub fn count(path: &Path) -> Result<usize> {
        let content = read_ledger(path)?;
        Ok(entries(complete_lines(&content))
            .collect::<HashSet<_>>()
            .len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, revision_id: &str) -> bool {
        self.ids.contains(revision_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in the order they were appended
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Durably record `revision_id`
    ///
    /// Returns `Ok(false)` if it was already recorded.
    pub fn append(&mut self, revision_id: &str) -> Result<bool> {
        if self.ids.contains(revision_id) {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error_at("append_ledger", &self.path, e))?;
        writeln!(file, "{}", revision_id).map_err(|e| io_error_at("append_ledger", &self.path, e))?;
        file.sync_data()
            .map_err(|e| io_error_at("sync_ledger", &self.path, e))?;

        self.ids.insert(revision_id.to_string());
        self.order.push(revision_id.to_string());
        Ok(true)
    }
}

fn read_ledger(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(io_error_at("open_ledger", path, e)),
    }
}

// Everything up to and including the last newline
fn complete_lines(content: &str) -> &str {
    let end = content.rfind('\n').map(|i| i + 1).unwrap_or(0);
    &content[..end]
}

fn entries(complete: &str) -> impl Iterator<Item = &str> {
    complete.lines().map(str::trim).filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".fetched.txt");

        let mut ledger = Ledger::open(&path).unwrap();
        assert!(ledger.is_empty());
        assert!(ledger.append("10").unwrap());
        assert!(ledger.append("11").unwrap());

        let reopened = Ledger::open(&path).unwrap();
        assert_eq!(reopened.ids(), &["10".to_string(), "11".to_string()]);
        assert!(reopened.contains("10"));
    }

    #[test]
    fn test_duplicate_append_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".fetched.txt");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append("10").unwrap();
        assert!(!ledger.append("10").unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "10\n");
    }

    #[test]
    fn test_torn_trailing_line_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".fetched.txt");
        fs::write(&path, "10\n11\n1").unwrap();

        let mut ledger = Ledger::open(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(!ledger.contains("1"));

        ledger.append("12").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "10\n11\n12\n");
    }

    #[test]
    fn test_count_leaves_torn_line_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".fetched.txt");
        fs::write(&path, "10\n11\n10\n1").unwrap();

        assert_eq!(Ledger::count(&path).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "10\n11\n10\n1");
    }

    #[test]
    fn test_count_of_missing_ledger_is_zero() {
        let temp_dir = TempDir::new().unwrap();

        assert_eq!(Ledger::count(&temp_dir.path().join(".fetched.txt")).unwrap(), 0);
    }
}
