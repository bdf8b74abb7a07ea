// Integration tests for the sync state directory

use tempfile::TempDir;
use wikirev_core::model::RevisionDetails;
use wikirev_core::{PageFilter, PageTracker, RevisionRecord};
use wikirev_store::state::{CURSOR_FILE, LEDGER_FILE, METADATA_FILE};
use wikirev_store::{CursorState, RepoMetadata, StateDir};

fn rec(page_id: &str, name: &str, rev: &str, comment: &str) -> RevisionRecord {
    RevisionRecord {
        page_id: page_id.to_string(),
        page_name: name.to_string(),
        revision_id: rev.to_string(),
        flag: "N".to_string(),
        date: 100,
        user: "alice".to_string(),
        comment: comment.to_string(),
    }
}

#[test]
fn test_cursor_round_trips_with_fingerprint() {
    let dir = TempDir::new().unwrap();
    let state = StateDir::new(dir.path());

    state.save_cursor(&CursorState::new(3, "abc")).unwrap();
    let cursor = state.load_cursor().unwrap().unwrap();

    assert_eq!(cursor.cursor, 3);
    assert!(cursor.matches("abc"));
    assert!(!cursor.matches("def"));
    assert!(state.exists(CURSOR_FILE));
}

#[test]
fn test_metadata_render_is_deterministic_and_loadable() {
    // Given: Metadata with filter memory and tracked pages
    let dir = TempDir::new().unwrap();
    let state = StateDir::new(dir.path());

    let mut pages = PageTracker::new();
    for (id, name, comment) in [("p2", "beta", ""), ("p1", "alpha", "Parent page set to: \"beta\".")] {
        let record = rec(id, name, "1", comment);
        let plan = pages.plan(&record, &RevisionDetails::default());
        pages.record(id, &plan);
    }
    let metadata = RepoMetadata {
        filter: PageFilter {
            category: Some("scp".to_string()),
            ..Default::default()
        },
        pages,
        last_revision: Some("1".to_string()),
    };

    // When: We render it twice and load it back
    let first = state.render_metadata(&metadata).unwrap();
    let second = state.render_metadata(&metadata).unwrap();
    std::fs::write(state.path(METADATA_FILE), &first).unwrap();

    // Then: Output is stable and restores the same state
    assert_eq!(first, second);
    assert!(first.find("\"p1\"").unwrap() < first.find("\"p2\"").unwrap());
    let loaded = state.load_metadata().unwrap().unwrap();
    assert_eq!(loaded, metadata);
    assert_eq!(loaded.pages.parent("p1"), Some("beta"));
}

#[test]
fn test_ledger_survives_transient_cleanup() {
    let dir = TempDir::new().unwrap();
    let state = StateDir::new(dir.path());

    let mut ledger = state.ledger().unwrap();
    ledger.append("7").unwrap();
    state.save_cursor(&CursorState::new(1, "abc")).unwrap();

    state.remove_transient().unwrap();

    assert!(state.load_cursor().unwrap().is_none());
    assert!(state.exists(LEDGER_FILE));
    assert!(state.ledger().unwrap().contains("7"));
}
