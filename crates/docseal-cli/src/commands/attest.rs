//! The `docseal attest` subcommand.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use docseal::{AttestResult, IntakeEvent, IntakeOutcome, Kernel, Submission};

use super::{print_json, read_json_items};

/// Arguments for `docseal attest`.
#[derive(Args)]
pub struct AttestArgs {
    /// Submission JSON files. A file may hold one object or an array of them.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output one JSON result per line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the attest command.
pub async fn execute(kernel: &Kernel, args: AttestArgs) -> Result<ExitCode> {
    let mut events = Vec::new();
    for path in &args.files {
        for (i, item) in read_json_items(path).await?.into_iter().enumerate() {
            let submission = Submission::from_value(item)
                .with_context(|| format!("{} item {} is not a submission", path.display(), i))?;
            events.push(IntakeEvent::Attest(submission));
        }
    }

    let mut failed = false;
    for outcome in kernel.dispatch(events).await {
        let result = match outcome {
            IntakeOutcome::Attestation(result) => result,
            IntakeOutcome::Aborted(reason) => {
                failed = true;
                eprintln!("[FAIL] {}", reason);
                continue;
            }
            IntakeOutcome::Verification(_) => continue,
        };

        match result {
            Ok(result) => {
                let (status, record) = match &result {
                    AttestResult::Attested(r) => ("attested", r),
                    AttestResult::AlreadyAttested(r) => ("already_attested", r),
                };
                if args.json {
                    print_json(&json!({"status": status, "record": record}))?;
                } else {
                    println!(
                        "[{}] {} content={} tx={}",
                        if result.is_new() { "NEW" } else { "SEEN" },
                        record.submission_id,
                        record.content_id,
                        record.transaction_id
                    );
                }
            }
            Err(err) => {
                failed = true;
                if args.json {
                    print_json(&json!({
                        "status": "failed",
                        "error": {"code": err.code(), "message": err.to_string()},
                    }))?;
                } else {
                    println!("[FAIL] {}: {}", err.code(), err);
                }
            }
        }
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
