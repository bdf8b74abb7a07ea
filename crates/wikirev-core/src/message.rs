//! Commit message and author synthesis for replayed revisions

use crate::model::RevisionRecord;

/// Marker appended when a revision carries no comment
pub const NO_MESSAGE: &str = "(no message)";

const ANONYMOUS: &str = "Anonymous";

/// Lifecycle verb leading a replay commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    /// Existing page edited without a comment
    Updated,
    /// No verb: an edit with a comment, or a rename whose source file is gone
    Edited,
    Renamed { from: String, to: String },
}

impl Lifecycle {
    fn prefix(&self) -> String {
        match self {
            Lifecycle::Created => "Created ".to_string(),
            Lifecycle::Updated => "Updated ".to_string(),
            Lifecycle::Edited => String::new(),
            Lifecycle::Renamed { from, to } => format!("Renamed from {} to {} ", from, to),
        }
    }
}

/// Build the message of a replay commit
///
/// `<verb><name>: <comment>` or `<verb><name> (no message)`.
pub fn commit_message(lifecycle: &Lifecycle, page_name: &str, comment: &str) -> String {
    let mut message = lifecycle.prefix();
    message.push_str(page_name);
    if comment.is_empty() {
        message.push(' ');
        message.push_str(NO_MESSAGE);
    } else {
        message.push_str(": ");
        message.push_str(comment);
    }
    message
}

/// Author identity synthesized from a revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
    /// Unix epoch seconds of the original revision
    pub time: i64,
}

impl Author {
    /// Author for `record` on the given site
    pub fn for_revision(record: &RevisionRecord, site: &str) -> Self {
        let name = sanitize_signature_name(record.user.trim());
        let name = if name.trim().is_empty() {
            ANONYMOUS.to_string()
        } else {
            name
        };
        Self {
            email: author_email(&name, site),
            name,
            time: record.date,
        }
    }
}

/// Address-safe token for a user name: `[A-Za-z0-9-.+]` only, lowercased
pub fn author_email(user: &str, site: &str) -> String {
    let local: String = user
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'))
        .collect::<String>()
        .to_lowercase();
    let local = if local.is_empty() {
        ANONYMOUS.to_lowercase()
    } else {
        local
    };
    format!("{}@{}", local, site)
}

// Git signatures reject angle brackets and line breaks in names.
fn sanitize_signature_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | '\n' | '\r'))
        .collect()
}
