//! Catalog build command

use std::path::Path;

use clap::Args;
use wikirev_engine::{build_catalog, CatalogReport, DumpSource};
use wikirev_store::StateDir;

use super::RunArgs;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

pub fn execute(args: CatalogArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.run.config(config_path)?;
    let source = DumpSource::load(&args.run.dump)?;
    let state = StateDir::new(&args.run.target);

    let (_, report) = build_catalog(&source, &state, &args.run.request(&config))?;
    print_report(&report);

    Ok(())
}

pub fn print_report(report: &CatalogReport) {
    println!(
        "Catalog: {} revisions ({} new) from {} pages",
        report.catalog_len, report.revisions_added, report.pages_selected
    );
    if report.pages_already_fetched > 0 {
        println!("  {} pages already fetched", report.pages_already_fetched);
    }
    if report.pages_failed > 0 {
        println!(
            "  {} pages failed and will be retried on the next run",
            report.pages_failed
        );
    }
    if report.pages_gone > 0 {
        println!("  {} pages no longer exist", report.pages_gone);
    }
}
