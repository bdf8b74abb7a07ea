// Integration tests for the read-only status report

mod common;

use std::fs::{self, OpenOptions};
use std::io::Write;

use common::*;
use tempfile::TempDir;
use wikirev_engine::status;
use wikirev_store::state::LEDGER_FILE;

#[test]
fn test_status_of_finished_mirror() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let source = DumpBuilder::new()
        .page("alpha", "a")
        .rev("alpha", "1", 100, "")
        .rev("alpha", "2", 200, "edit")
        .build();
    run_full(&source, &root);

    let report = status(&root).unwrap();

    assert_eq!(report.catalog_len, None);
    assert_eq!(report.remaining(), None);
    assert_eq!(report.ledger_len, 2);
    assert_eq!(report.tracked_pages, 1);
    assert_eq!(report.last_revision.as_deref(), Some("2"));
}

#[test]
fn test_status_leaves_torn_ledger_untouched() {
    // Given: A mirror whose ledger ends in a half-written id
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let source = DumpBuilder::new()
        .page("alpha", "a")
        .rev("alpha", "1", 100, "")
        .rev("alpha", "2", 200, "edit")
        .build();
    run_full(&source, &root);
    let ledger = root.join(LEDGER_FILE);
    let mut file = OpenOptions::new().append(true).open(&ledger).unwrap();
    write!(file, "3").unwrap();
    drop(file);
    let before = fs::read_to_string(&ledger).unwrap();

    // When: Status is requested
    let report = status(&root).unwrap();

    // Then: Only complete entries count and the file is unchanged
    assert_eq!(report.ledger_len, 2);
    assert_eq!(fs::read_to_string(&ledger).unwrap(), before);
}
