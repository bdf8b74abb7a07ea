//! Error handling for wikirev-store
//!
//! Wraps wikirev-core ExError with store-specific helpers

use std::path::Path;

use wikirev_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error naming the file involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create a serialization error for a state file
pub fn serialization_error(operation: &str, path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create an error from git2::Error
pub fn git_error(operation: &str, err: git2::Error) -> ExError {
    ExError::new(ExErrorKind::VersionControl)
        .with_op(operation.to_string())
        .with_message(err.message().to_string())
}
