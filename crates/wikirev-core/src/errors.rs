use wikirev_core_types::RunId;
use thiserror::Error;

/// Result type alias using WikiRevError
pub type Result<T> = std::result::Result<T, WikiRevError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on
/// without parsing messages. Kinds are grouped by how a sync run reacts:
/// per-item failures are recovered locally, structural ones stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / selection
    InvalidInput,
    NotFound,
    /// A previously listed page no longer resolves to an id
    PageGone,

    // Structural
    /// Tracked metadata and the target store disagree (fatal)
    InvariantViolation,
    /// Catalog on disk does not match the cursor fingerprint
    CatalogMismatch,
    /// Finalize requested before every catalog entry was processed
    NotDrained,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    VersionControl,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::PageGone => "ERR_PAGE_GONE",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::CatalogMismatch => "ERR_CATALOG_MISMATCH",
            ExErrorKind::NotDrained => "ERR_NOT_DRAINED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::VersionControl => "ERR_VERSION_CONTROL",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a run may skip the failing item and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::PageGone | ExErrorKind::ExternalService | ExErrorKind::NotFound
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification plus the page / revision context needed to
/// resume a run by hand.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    page: Option<String>,
    revision_id: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            page: None,
            revision_id: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add page context (display name or remote id)
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Add revision id context
    pub fn with_revision_id(mut self, revision_id: impl Into<String>) -> Self {
        self.revision_id = Some(revision_id.into());
        self
    }

    /// Add run correlation
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the page context, if any
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// Get the revision id context, if any
    pub fn revision_id(&self) -> Option<&str> {
        self.revision_id.as_deref()
    }

    /// Get the run id, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(page) = &self.page {
            write!(f, " (page: {})", page)?;
        }
        if let Some(revision_id) = &self.revision_id {
            write!(f, " (revision: {})", revision_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the pure sync logic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WikiRevError {
    /// A child page file has no `parent:` line naming the renamed parent
    #[error("Cannot update child page {child}: it is expected to have parent set to {expected_parent}, but there is no such record in it")]
    ParentLineMissing {
        child: String,
        expected_parent: String,
    },

    /// Catalog operation requires a sorted catalog
    #[error("Catalog must be sorted before replay begins")]
    CatalogNotSorted,

    /// Catalog was mutated after sorting
    #[error("Catalog is sealed: cannot append revision {revision_id} after sorting")]
    CatalogSealed { revision_id: String },

    /// Cursor points past the end of the catalog
    #[error("Cursor {cursor} is beyond catalog length {len}")]
    CursorOutOfRange { cursor: usize, len: usize },

    /// Page name cannot be turned into a file name
    #[error("Invalid page name: {reason}")]
    InvalidPageName { reason: String },

    /// Serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<WikiRevError> for ExError {
    fn from(err: WikiRevError) -> Self {
        match err {
            WikiRevError::ParentLineMissing {
                child,
                expected_parent,
            } => ExError::new(ExErrorKind::InvariantViolation)
                .with_op("update_parent_field")
                .with_page(child)
                .with_message(format!(
                    "Expected a 'parent:{}' line but found none",
                    expected_parent
                )),

            WikiRevError::CatalogNotSorted => ExError::new(ExErrorKind::Internal)
                .with_op("catalog")
                .with_message("Catalog must be sorted before replay begins"),

            WikiRevError::CatalogSealed { revision_id } => ExError::new(ExErrorKind::Internal)
                .with_op("catalog_append")
                .with_revision_id(revision_id)
                .with_message("Catalog is sealed after sorting"),

            WikiRevError::CursorOutOfRange { cursor, len } => {
                ExError::new(ExErrorKind::CatalogMismatch)
                    .with_op("cursor")
                    .with_message(format!("Cursor {} is beyond catalog length {}", cursor, len))
            }

            WikiRevError::InvalidPageName { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid page name: {}", reason)),

            WikiRevError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to WikiRevError
impl From<serde_json::Error> for WikiRevError {
    fn from(err: serde_json::Error) -> Self {
        WikiRevError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::PageGone, "ERR_PAGE_GONE"),
            (ExErrorKind::InvariantViolation, "ERR_INVARIANT_VIOLATION"),
            (ExErrorKind::NotDrained, "ERR_NOT_DRAINED"),
            (ExErrorKind::VersionControl, "ERR_VERSION_CONTROL"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_invariant_violation_is_not_recoverable() {
        assert!(!ExErrorKind::InvariantViolation.is_recoverable());
        assert!(ExErrorKind::PageGone.is_recoverable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::VersionControl)
            .with_op("commit")
            .with_revision_id("42")
            .with_message("index locked");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_VERSION_CONTROL]"));
        assert!(text.contains("commit"));
        assert!(text.contains("revision: 42"));
    }
}
