// Integration tests for the git-backed target
// Covers commit identity, rename staging and crash recovery

use tempfile::TempDir;
use wikirev_core::message::Author;
use wikirev_store::GitTarget;

fn setup_target() -> (TempDir, GitTarget) {
    let dir = TempDir::new().expect("Failed to create temp target directory");
    let (target, created) = GitTarget::open_or_init(&dir.path().join("mirror")).unwrap();
    assert!(created);
    (dir, target)
}

fn author(name: &str, time: i64) -> Author {
    Author {
        name: name.to_string(),
        email: format!("{}@site", name.to_lowercase()),
        time,
    }
}

#[test]
fn test_commit_uses_revision_author_and_time() {
    // Given: A fresh target with one written page
    let (_dir, target) = setup_target();
    target.write("alpha.txt", "hello").unwrap();
    target.stage(&["alpha.txt"]).unwrap();

    // When: We commit as the revision author
    target
        .commit("Created alpha (no message)", &author("Alice", 1_300_000_000))
        .unwrap();

    // Then: Author and committer carry the revision identity and time
    let history = target.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, "Created alpha (no message)");
    assert_eq!(history[0].author_name, "Alice");
    assert_eq!(history[0].author_email, "alice@site");
    assert_eq!(history[0].author_time, 1_300_000_000);
    assert_eq!(history[0].committer_time, 1_300_000_000);
}

#[test]
fn test_history_is_oldest_first() {
    let (_dir, target) = setup_target();
    for (i, body) in ["one", "two", "three"].iter().enumerate() {
        target.write("alpha.txt", body).unwrap();
        target.stage(&["alpha.txt"]).unwrap();
        target
            .commit(body, &author("Alice", 100 + i as i64))
            .unwrap();
    }

    let messages: Vec<_> = target
        .history()
        .unwrap()
        .into_iter()
        .map(|c| c.message)
        .collect();
    assert_eq!(messages, vec!["one", "two", "three"]);
}

#[test]
fn test_rename_moves_file_in_one_commit() {
    // Given: A committed page
    let (_dir, target) = setup_target();
    target.write("delta.txt", "body").unwrap();
    target.stage(&["delta.txt"]).unwrap();
    target.commit("Created delta", &author("Alice", 100)).unwrap();

    // When: We rename and commit
    target.rename("delta.txt", "delta2.txt").unwrap();
    target.stage(&["delta2.txt"]).unwrap();
    let oid = target.commit("Renamed", &author("Alice", 200)).unwrap();

    // Then: Only the new name exists in the commit
    let id = oid.to_string();
    assert_eq!(target.file_at(&id, "delta2.txt").unwrap().as_deref(), Some("body"));
    assert_eq!(target.file_at(&id, "delta.txt").unwrap(), None);
    assert!(!target.exists("delta.txt"));
}

#[test]
fn test_restore_head_discards_uncommitted_work() {
    // Given: A committed page with uncommitted edits on top
    let (_dir, target) = setup_target();
    target.write("alpha.txt", "committed").unwrap();
    target.stage(&["alpha.txt"]).unwrap();
    target.commit("Created alpha", &author("Alice", 100)).unwrap();

    target.write("alpha.txt", "half written").unwrap();
    target.stage(&["alpha.txt"]).unwrap();

    // When: The target is restored
    target.restore_head(&[]).unwrap();

    // Then: The working tree matches HEAD again
    assert_eq!(target.read("alpha.txt").unwrap(), "committed");
}

#[test]
fn test_restore_head_keeps_listed_files() {
    // Given: A committed ledger that grew after the commit
    let (_dir, target) = setup_target();
    target.write(".fetched.txt", "1\n").unwrap();
    target.write("alpha.txt", "committed").unwrap();
    target.stage(&[".fetched.txt", "alpha.txt"]).unwrap();
    target.commit_as_tool("Updating fetched revisions").unwrap();
    target.write(".fetched.txt", "1\n2\n").unwrap();
    target.write("alpha.txt", "half written").unwrap();

    // When: The target is restored keeping the ledger
    target.restore_head(&[".fetched.txt"]).unwrap();

    // Then: The ledger keeps its growth, the page is reverted
    assert_eq!(target.read(".fetched.txt").unwrap(), "1\n2\n");
    assert_eq!(target.read("alpha.txt").unwrap(), "committed");
    assert_eq!(
        target.file_at("HEAD", ".fetched.txt").unwrap().as_deref(),
        Some("1\n")
    );
}

#[test]
fn test_restore_head_on_empty_repo_is_a_no_op() {
    let (_dir, target) = setup_target();
    assert!(!target.has_commits());
    target.restore_head(&[]).unwrap();
    assert!(target.history().unwrap().is_empty());
}

#[test]
fn test_reopen_existing_target() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    {
        let (target, _) = GitTarget::open_or_init(&root).unwrap();
        target.write(".revid", "").unwrap();
        target.stage(&[".revid"]).unwrap();
        target.commit_as_tool("Initial creation of repo").unwrap();
    }

    let (target, created) = GitTarget::open_or_init(&root).unwrap();
    assert!(!created);
    let history = target.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].author_name, "wikirev");
}
