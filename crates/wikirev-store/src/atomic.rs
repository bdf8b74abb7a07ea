//! Atomic write primitives
//!
//! Uses temp→rename so a crash never leaves a half-written state file

use crate::errors::{io_error_at, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn temp_path(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target_path.with_file_name(name)
}

/// Atomically write bytes to a file
///
/// The temp file sits next to the target so the rename stays on one
/// filesystem.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_at("create_state_dir", parent, e))?;
    }

    let temp = temp_path(target_path);
    {
        let mut file = fs::File::create(&temp).map_err(|e| io_error_at("create_temp", &temp, e))?;
        file.write_all(content)
            .map_err(|e| io_error_at("write_temp", &temp, e))?;
        file.sync_all().map_err(|e| io_error_at("sync_temp", &temp, e))?;
    }

    fs::rename(&temp, target_path).map_err(|e| io_error_at("rename_temp", target_path, e))?;

    Ok(())
}
