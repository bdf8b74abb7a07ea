//! Sync command: build → open → step* → finalize

use std::path::Path;

use clap::Args;
use wikirev_engine::{build_catalog, DumpSource, SessionOptions, StepOutcome, SyncSession};
use wikirev_store::StateDir;

use super::catalog::print_report;
use super::RunArgs;

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Stop after this many commits without finalizing
    #[arg(long)]
    pub max_steps: Option<usize>,
}

pub fn execute(args: SyncArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.run.config(config_path)?;
    let source = DumpSource::load(&args.run.dump)?;
    let state = StateDir::new(&args.run.target);

    let (catalog, report) = build_catalog(&source, &state, &args.run.request(&config))?;
    print_report(&report);

    let options = SessionOptions {
        filter: report.filter,
        store_revision_ids: config.store_revision_ids,
    };
    let mut session = SyncSession::open(&source, &args.run.target, catalog, options)?;

    let mut committed = 0;
    loop {
        if args.max_steps.is_some_and(|max| committed >= max) {
            println!(
                "Stopped after {} commits, {} revisions remain; run sync again to continue",
                committed,
                session.remaining()
            );
            return Ok(());
        }
        match session.step()? {
            StepOutcome::Committed { index, message, .. } => {
                println!("Committing: {}. {}", index, message);
                committed += 1;
            }
            StepOutcome::Skipped { index, revision_id } => {
                println!("Skipping: {}. revision {} already committed", index, revision_id);
            }
            StepOutcome::Exhausted => break,
        }
    }

    let finalized = session.finalize()?;
    println!("Done: {} revisions committed", finalized.steps_executed);

    Ok(())
}
