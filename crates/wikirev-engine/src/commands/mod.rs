//! Command orchestration layer.
//!
//! Each command coordinates the remote source, the pure core logic and the
//! local store, and owns the lifecycle logging of its operation.

pub mod catalog;
pub mod status;
pub mod sync;
