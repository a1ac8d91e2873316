//! The `docseal records` subcommand.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use docseal::Kernel;

use super::print_json;

/// Arguments for `docseal records`.
#[derive(Args)]
pub struct RecordsArgs {
    /// Output as a JSON array.
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(kernel: &Kernel, args: &RecordsArgs) -> Result<ExitCode> {
    let records = kernel.records().await?;

    if args.json {
        print_json(&records)?;
    } else {
        for r in &records {
            println!("{}\t{}\t{}", r.submission_id, r.content_id, r.transaction_id);
        }
        eprintln!("{} record(s)", records.len());
    }
    Ok(ExitCode::SUCCESS)
}
