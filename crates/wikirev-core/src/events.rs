//! Structural event classifier
//!
//! The source never reports renames or re-parenting directly. Renames show
//! up as a revision-time name that differs from the tracked name; parent
//! changes only surface as a revision comment with a fixed prefix. All of
//! that string matching lives here.

/// Comment prefix the source writes when a page's parent changes
pub const PARENT_SET_PREFIX: &str = "Parent page set to: \"";

/// What a revision does to a page's structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    NoEvent,
    /// Tracked name `from` becomes `to` at this revision
    Rename { from: String, to: String },
    /// The page's parent is set to `parent`
    Reparent { parent: String },
}

/// Classify a revision
///
/// * `tracked_name` - last name materialized for this page, if any
/// * `revision_name` - name reported by the revision itself
/// * `comment` - the revision comment
///
/// A rename wins over a reparent notice here; the notice's parent is
/// still applied by the tracker.
pub fn classify(tracked_name: Option<&str>, revision_name: &str, comment: &str) -> PageEvent {
    if let Some(from) = tracked_name {
        if from != revision_name {
            return PageEvent::Rename {
                from: from.to_string(),
                to: revision_name.to_string(),
            };
        }
    }
    match parse_parent_comment(comment) {
        Some(parent) => PageEvent::Reparent { parent },
        None => PageEvent::NoEvent,
    }
}

/// Extract the new parent name from a reparent comment
///
/// The name runs from the prefix to the last `"`, so both
/// `Parent page set to: "beta".` and `Parent page set to: "beta"` give `beta`.
pub fn parse_parent_comment(comment: &str) -> Option<String> {
    let rest = comment.strip_prefix(PARENT_SET_PREFIX)?;
    let end = rest.rfind('"')?;
    let parent = &rest[..end];
    if parent.is_empty() {
        return None;
    }
    Some(parent.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_page_has_no_rename() {
        assert_eq!(classify(None, "alpha", ""), PageEvent::NoEvent);
    }

    #[test]
    fn test_same_name_is_not_a_rename() {
        assert_eq!(classify(Some("alpha"), "alpha", "fix typo"), PageEvent::NoEvent);
    }

    #[test]
    fn test_changed_name_is_a_rename() {
        assert_eq!(
            classify(Some("delta"), "delta2", "Page name changed"),
            PageEvent::Rename {
                from: "delta".to_string(),
                to: "delta2".to_string()
            }
        );
    }

    #[test]
    fn test_reparent_comment() {
        assert_eq!(
            classify(Some("alpha"), "alpha", "Parent page set to: \"beta\"."),
            PageEvent::Reparent {
                parent: "beta".to_string()
            }
        );
    }

    #[test]
    fn test_parse_parent_without_trailing_period() {
        assert_eq!(
            parse_parent_comment("Parent page set to: \"beta\""),
            Some("beta".to_string())
        );
    }

    #[test]
    fn test_parse_parent_with_category_name() {
        assert_eq!(
            parse_parent_comment("Parent page set to: \"system:join\"."),
            Some("system:join".to_string())
        );
    }

    #[test]
    fn test_parse_parent_rejects_other_comments() {
        assert_eq!(parse_parent_comment("Parent page set to beta"), None);
        assert_eq!(parse_parent_comment("  Parent page set to: \"beta\""), None);
        assert_eq!(parse_parent_comment("Parent page set to: \""), None);
        assert_eq!(parse_parent_comment("Parent page set to: \"\""), None);
    }
}
