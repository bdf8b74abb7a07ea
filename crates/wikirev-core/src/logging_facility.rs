//! Structured logging facility for wikirev
//!
//! - Single initialization point via `init(profile)`
//! - Structured lifecycle macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! The engine layer owns lifecycle events for `build_catalog`, `open_target`,
//! `step` and `finalize`. Store and core code only emit `debug!`/`warn!`.
//!
//! ```rust
//! use wikirev_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
