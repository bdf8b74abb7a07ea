//! Version-control target
//!
//! The replay writes page files into the working tree of a local git
//! repository and commits one revision at a time. Nothing is pushed.

mod target;

pub use target::{CommitSummary, GitTarget, TOOL_EMAIL, TOOL_NAME};
