//! Status command

use std::path::PathBuf;

use clap::Args;
use wikirev_engine::status;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Target repository directory
    #[arg(long)]
    pub target: PathBuf,
}

pub fn execute(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let status = status(&args.target)?;

    println!("target: {}", args.target.display());
    println!("commits: {}", status.commits);
    println!("tracked pages: {}", status.tracked_pages);
    println!("ledger: {} revisions", status.ledger_len);
    if let Some(last) = &status.last_revision {
        println!("last revision: {}", last);
    }
    match (status.catalog_len, status.remaining()) {
        (Some(len), Some(remaining)) => {
            println!("catalog: {} revisions, {} remaining", len, remaining)
        }
        _ => println!("catalog: none (no run in progress)"),
    }
    println!(
        "filter: category={} tags={} created_by={}",
        status.filter.category_or_all(),
        status.filter.tags.as_deref().unwrap_or("-"),
        status.filter.created_by.as_deref().unwrap_or("-")
    );

    Ok(())
}
