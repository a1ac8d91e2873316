//! Docseal CLI: attest documents on a ledger and verify them later.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

/// Docseal: document attestation and verification.
///
/// Submissions are canonicalized, stored in a content store, and their
/// content ids recorded on a ledger. Verification replays the ledger record
/// against the content a requester expects.
#[derive(Parser)]
#[command(name = "docseal", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./docseal.toml when present).
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON (for machine consumption).
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Attest submission JSON files.
    Attest(commands::attest::AttestArgs),
    /// Verify that transactions attest the expected content.
    Verify(commands::verify::VerifyArgs),
    /// Show the correlation record for a submission.
    Show(commands::show::ShowArgs),
    /// List correlation records.
    Records(commands::records::RecordsArgs),
    /// Fetch a transaction and decode its call data.
    Tx(commands::tx::TxArgs),
    /// Compute function selectors.
    Selector(commands::selector::SelectorArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Attest(args) => commands::attest::execute(&commands::kernel(config)?, args).await,
        Commands::Verify(args) => commands::verify::execute(&commands::kernel(config)?, args).await,
        Commands::Show(args) => commands::show::execute(&commands::kernel(config)?, &args).await,
        Commands::Records(args) => {
            commands::records::execute(&commands::kernel(config)?, &args).await
        }
        Commands::Tx(args) => commands::tx::execute(&commands::kernel(config)?, &args).await,
        Commands::Selector(args) => commands::selector::execute(&args),
    }
}
