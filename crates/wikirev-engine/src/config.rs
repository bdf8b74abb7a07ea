//! Run configuration
//!
//! Loaded from a TOML file. Every field is optional in the file; command
//! line flags override file values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wikirev_core::errors::{ExError, ExErrorKind};
use wikirev_core::PageFilter;
use wikirev_store::errors::{io_error_at, Result};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "wikirev.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Maximum revisions fetched per page
    pub depth: usize,
    /// Concurrent page fetches during catalog build
    pub workers: usize,
    /// Page names never mirrored
    pub denylist: Vec<String>,
    /// Write the `.revid` sentinel with every commit
    pub store_revision_ids: bool,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub created_by: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            depth: 10_000,
            workers: 1,
            denylist: vec!["sandbox".to_string()],
            store_revision_ids: true,
            category: None,
            tags: None,
            created_by: None,
        }
    }
}

impl SyncConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_error_at("load_config", path, e))?;
        Self::from_toml(&text).map_err(|e| {
            let message = format!("{}: {}", path.display(), e.message());
            e.with_message(message)
        })
    }

    /// Load `path`, or `wikirev.toml` in `dir` when present, else defaults
    pub fn load_or_default(path: Option<&Path>, dir: &Path) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = dir.join(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(&fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_config")
                .with_message(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_config")
                .with_message("depth must be at least 1"));
        }
        Ok(())
    }

    /// Filter built from the configured category, tags and creator
    pub fn filter(&self) -> PageFilter {
        PageFilter {
            category: self.category.clone(),
            tags: self.tags.clone(),
            created_by: self.created_by.clone(),
        }
    }

    /// Worker count, never below one
    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }
}
