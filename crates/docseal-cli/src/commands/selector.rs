//! The `docseal selector` subcommand.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use docseal::core::FunctionSignature;

/// Arguments for `docseal selector`.
#[derive(Args)]
pub struct SelectorArgs {
    /// Signatures such as `addDocument(string)`.
    #[arg(required = true)]
    pub signatures: Vec<String>,
}

pub fn execute(args: &SelectorArgs) -> Result<ExitCode> {
    for text in &args.signatures {
        let signature = FunctionSignature::parse(text)?;
        println!("{}  {}", signature.selector(), signature);
    }
    Ok(ExitCode::SUCCESS)
}
