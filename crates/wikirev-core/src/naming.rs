//! Target file naming
//!
//! Page names may contain `:` (category separator), which Windows does not
//! allow in file names. Files are named by replacing it with `~`.

use crate::errors::{Result, WikiRevError};

/// Extension of every page file
pub const PAGE_FILE_EXTENSION: &str = "txt";

/// Windows-safe transliteration of a page name
pub fn winsafe_name(page_name: &str) -> String {
    page_name.replace(':', "~")
}

/// File name (relative to the target root) holding a page
pub fn page_file_name(page_name: &str) -> Result<String> {
    if page_name.is_empty() {
        return Err(WikiRevError::InvalidPageName {
            reason: "page name is empty".to_string(),
        });
    }
    if page_name.contains(['/', '\\']) || page_name == "." || page_name == ".." {
        return Err(WikiRevError::InvalidPageName {
            reason: format!("'{}' would escape the target directory", page_name),
        });
    }
    Ok(format!("{}.{}", winsafe_name(page_name), PAGE_FILE_EXTENSION))
}
