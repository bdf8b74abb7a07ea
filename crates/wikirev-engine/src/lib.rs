//! wikirev Engine - Orchestration layer
//!
//! Wires the pure core logic to the local store and the remote source:
//! - `WikiSource`, the remote wiki collaborator, and `DumpSource`
//! - `SyncConfig`, the TOML run configuration
//! - `build_catalog`, the resumable revision catalog builder
//! - `SyncSession`, the snapshot commit driver (open, step, finalize)

pub mod commands;
pub mod config;
pub mod source;

pub use commands::catalog::{build_catalog, CatalogReport, CatalogRequest};
pub use commands::status::{status, SyncStatus};
pub use commands::sync::{FinalizeReport, SessionOptions, StepOutcome, SyncSession};
pub use config::SyncConfig;
pub use source::{DumpSource, WikiSource};
