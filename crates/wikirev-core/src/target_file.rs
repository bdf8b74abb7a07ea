//! Page file representation in the target store
//!
//! A page file is a short header of `title:`, `tags:` and `parent:` lines
//! (each only when present) followed by the raw revision source. Files
//! are always rewritten in full; the only in-place edit is the `parent:`
//! line of a child page when its parent is renamed.

use crate::errors::{Result, WikiRevError};

const TITLE_KEY: &str = "title:";
const TAGS_KEY: &str = "tags:";
const PARENT_KEY: &str = "parent:";

/// Full content of one page file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFile {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub parent: Option<String>,
    pub body: String,
}

impl TargetFile {
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 64);
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(TITLE_KEY);
            out.push_str(title);
            out.push('\n');
        }
        if !self.tags.is_empty() {
            out.push_str(TAGS_KEY);
            out.push_str(&self.tags.join(" "));
            out.push('\n');
        }
        if let Some(parent) = self.parent.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(PARENT_KEY);
            out.push_str(parent);
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

/// Rewrite the `parent:<old>` line of a child page file
///
/// Everything else is preserved byte for byte. Only the first matching
/// line is replaced. A missing line means the tracker and the target have
/// diverged, which is an error.
pub fn rewrite_parent_line(
    content: &str,
    child: &str,
    old_parent: &str,
    new_parent: &str,
) -> Result<String> {
    let expected = format!("{}{}", PARENT_KEY, old_parent);
    let mut out = String::with_capacity(content.len() + new_parent.len());
    let mut replaced = false;

    for line in content.split_inclusive('\n') {
        let bare = line.strip_suffix('\n').unwrap_or(line);
        if !replaced && bare == expected && line.ends_with('\n') {
            out.push_str(PARENT_KEY);
            out.push_str(new_parent);
            out.push('\n');
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    if !replaced {
        return Err(WikiRevError::ParentLineMissing {
            child: child.to_string(),
            expected_parent: old_parent.to_string(),
        });
    }
    Ok(out)
}
