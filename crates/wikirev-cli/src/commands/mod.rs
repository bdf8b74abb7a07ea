//! Subcommand implementations

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use wikirev_engine::{CatalogRequest, SyncConfig};

pub mod catalog;
pub mod status;
pub mod sync;

/// Options shared by every command that reads the wiki
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Target repository directory
    #[arg(long)]
    pub target: PathBuf,

    /// JSON site dump to read the wiki from
    #[arg(long)]
    pub dump: PathBuf,

    /// Page to mirror (repeatable); every page matching the filter when absent
    #[arg(long = "page")]
    pub pages: Vec<String>,

    /// Maximum revisions fetched per page
    #[arg(long)]
    pub depth: Option<usize>,

    /// Category filter ("." for all)
    #[arg(long)]
    pub category: Option<String>,

    /// Space separated tag filter
    #[arg(long)]
    pub tags: Option<String>,

    /// Page creator filter
    #[arg(long)]
    pub created_by: Option<String>,

    /// Concurrent page fetches during catalog build
    #[arg(long)]
    pub workers: Option<usize>,
}

impl RunArgs {
    /// Config file values overridden by flags
    pub fn config(&self, config_path: Option<&Path>) -> Result<SyncConfig, Box<dyn Error>> {
        let cwd = std::env::current_dir()?;
        let mut config = SyncConfig::load_or_default(config_path, &cwd)?;
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.category.is_some() {
            config.category = self.category.clone();
        }
        if self.tags.is_some() {
            config.tags = self.tags.clone();
        }
        if self.created_by.is_some() {
            config.created_by = self.created_by.clone();
        }
        Ok(config)
    }

    pub fn request(&self, config: &SyncConfig) -> CatalogRequest {
        CatalogRequest::from_config(config, self.pages.clone())
    }
}
