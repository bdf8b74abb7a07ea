//! wikirev Store - local persistence and the version-control target
//!
//! Provides:
//! - Atomic file writes (temp → rename)
//! - The state directory: catalog blob, page-list cache, ledger, cursor,
//!   and the metadata blob that is committed into the target
//! - `GitTarget`, the git2-backed repository the history is replayed into

pub mod atomic;
pub mod errors;
pub mod git;
pub mod state;

// Re-export key types
pub use errors::Result;
pub use git::{CommitSummary, GitTarget};
pub use state::{CursorState, Ledger, RepoMetadata, StateDir};
