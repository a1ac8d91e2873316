//! The `docseal show` subcommand.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use docseal::{Kernel, SubmissionId};

use super::print_json;

/// Arguments for `docseal show`.
#[derive(Args)]
pub struct ShowArgs {
    /// Submission identity.
    pub submission: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(kernel: &Kernel, args: &ShowArgs) -> Result<ExitCode> {
    let Some(record) = kernel.record(&SubmissionId::new(args.submission.as_str())).await? else {
        eprintln!("no correlation recorded for {}", args.submission);
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        print_json(&record)?;
    } else {
        println!("Submission:  {}", record.submission_id);
        println!("Content:     {}", record.content_id);
        println!("Transaction: {}", record.transaction_id);
        if let Some(owner) = &record.owner {
            println!("Owner:       {}", owner);
        }
        if let Some(claim) = &record.claim_id {
            println!("Claim:       {}", claim);
        }
        println!("Created:     {}", record.created_at);
    }
    Ok(ExitCode::SUCCESS)
}
