//! wikirev Core - pure synchronization logic
//!
//! This crate holds everything about mirroring a wiki's history that does
//! not touch the network or the disk:
//! - Revision records and page selectors
//! - The date-ordered revision catalog and its per-page index
//! - The rename / reparent event classifier
//! - The naming & hierarchy tracker
//! - Page file rendering and `parent:` line patching
//! - Commit message and author synthesis
//! - The error and logging facilities shared by the other crates

pub mod catalog;
pub mod errors;
pub mod events;
pub mod logging_facility;
pub mod message;
pub mod model;
pub mod naming;
pub mod target_file;
pub mod tracker;

// Macros expand to paths under this re-export
pub use wikirev_core_types;

// Re-export commonly used types
pub use catalog::{Catalog, PageIndex, TagSource};
pub use errors::{ExError, ExErrorKind, Result, WikiRevError};
pub use events::PageEvent;
pub use model::{PageFilter, PageSelector, RemoteRevision, RevisionDetails, RevisionRecord};
pub use tracker::{PageTracker, StepPlan};
