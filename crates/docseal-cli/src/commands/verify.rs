//! The `docseal verify` subcommand.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::json;

use docseal::{ContentId, IntakeEvent, IntakeOutcome, Kernel, TransactionId, VerificationRequest};

use super::{print_json, read_json_items};

/// Arguments for `docseal verify`.
#[derive(Args)]
pub struct VerifyArgs {
    /// Verification request JSON files.
    pub files: Vec<PathBuf>,

    /// Expected content id (instead of request files).
    #[arg(long, requires = "transaction")]
    pub content_id: Option<String>,

    /// Transaction to check.
    #[arg(long, requires = "content_id")]
    pub transaction: Option<String>,

    /// Who is asking.
    #[arg(long, default_value = "")]
    pub requester: String,

    /// Whose document it is.
    #[arg(long, default_value = "")]
    pub subject: String,

    /// Output one JSON result per line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the verify command.
pub async fn execute(kernel: &Kernel, args: VerifyArgs) -> Result<ExitCode> {
    let mut requests = Vec::new();
    if let (Some(content_id), Some(transaction)) = (&args.content_id, &args.transaction) {
        requests.push(VerificationRequest {
            expected_content_id: ContentId::new(content_id.as_str()),
            transaction_id: TransactionId::new(transaction.as_str()),
            requester: args.requester.clone(),
            subject: args.subject.clone(),
        });
    }
    for path in &args.files {
        for (i, item) in read_json_items(path).await?.into_iter().enumerate() {
            let request: VerificationRequest = serde_json::from_value(item).with_context(|| {
                format!("{} item {} is not a verification request", path.display(), i)
            })?;
            requests.push(request);
        }
    }
    if requests.is_empty() {
        bail!("nothing to verify: pass request files or --content-id with --transaction");
    }

    let events = requests.iter().cloned().map(IntakeEvent::Verify);
    let mut all_verified = true;

    for (request, outcome) in requests.iter().zip(kernel.dispatch(events).await) {
        let outcome = match outcome {
            IntakeOutcome::Verification(outcome) => outcome,
            IntakeOutcome::Aborted(reason) => {
                all_verified = false;
                eprintln!("[FAIL] {}: {}", request.transaction_id, reason);
                continue;
            }
            IntakeOutcome::Attestation(_) => continue,
        };
        all_verified &= outcome.is_verified();

        if args.json {
            print_json(&json!({
                "transaction_id": request.transaction_id,
                "expected_content_id": request.expected_content_id,
                "outcome": outcome.code(),
                "verified": outcome.is_verified(),
                "decoded_content_id": outcome.decoded_content_id(),
                "payload": outcome.payload(),
                "detail": outcome.detail(),
            }))?;
        } else if outcome.is_verified() {
            println!("[PASS] {} attests {}", request.transaction_id, request.expected_content_id);
        } else {
            println!(
                "[FAIL] {} {}: {}",
                request.transaction_id,
                outcome.code(),
                outcome.detail().unwrap_or("content differs")
            );
        }
    }

    Ok(if all_verified { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
