// Lifecycle logging of engine operations, asserted through test capture

mod common;

use common::*;
use tempfile::TempDir;
use wikirev_core::logging_facility::init_test_capture;

#[test]
fn test_full_run_emits_lifecycle_events() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let source = DumpBuilder::new()
        .page("alpha", "a")
        .rev("alpha", "1", 100, "")
        .build();

    run_full(&source, &root);

    for op in ["build_catalog", "open_target", "step", "finalize"] {
        capture.assert_event_exists(op, "start");
        capture.assert_event_exists(op, "end");
    }
}

#[test]
fn test_refused_finalize_logs_error_code() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let source = DumpBuilder::new()
        .page("alpha", "a")
        .rev("alpha", "1", 100, "")
        .build();

    let session = open(&source, &root);
    session.finalize().unwrap_err();

    let refused = capture
        .events_for_op("finalize")
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some("end_error") && e.field("err_code") == Some("ERR_NOT_DRAINED")
        })
        .count();
    assert!(refused >= 1);
}

#[test]
fn test_failed_page_fetch_is_a_warning() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let state = wikirev_store::StateDir::new(dir.path());
    let source = FlakySource::new(
        DumpBuilder::new()
            .page("flaky-page", "f")
            .rev("flaky-page", "1", 100, "")
            .build(),
        &["flaky-page"],
    );

    wikirev_engine::build_catalog(&source, &state, &all_pages(1)).unwrap();

    let warnings = capture.warnings_with("page", "flaky-page");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].target.starts_with("wikirev_engine"));
}
