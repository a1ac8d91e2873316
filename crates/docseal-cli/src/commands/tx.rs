//! The `docseal tx` subcommand.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use docseal::{Kernel, TransactionId};

use super::print_json;

/// Arguments for `docseal tx`.
#[derive(Args)]
pub struct TxArgs {
    /// Transaction id.
    pub transaction: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(kernel: &Kernel, args: &TxArgs) -> Result<ExitCode> {
    let (tx, call) = kernel
        .inspect_transaction(&TransactionId::new(args.transaction.as_str()))
        .await?;

    let args_text: Vec<String> = call.args.iter().map(ToString::to_string).collect();
    if args.json {
        print_json(&json!({
            "transaction_id": tx.transaction_id,
            "from": tx.from,
            "block": tx.block.as_ref().map(|b| json!({"number": b.number, "hash": b.hash})),
            "call_data": format!("0x{}", hex::encode(&tx.call_data)),
            "function": call.signature.canonical(),
            "selector": call.selector().to_hex(),
            "args": args_text,
        }))?;
    } else {
        println!("Transaction: {}", tx.transaction_id);
        println!("From:        {}", tx.from);
        match &tx.block {
            Some(block) => println!("Block:       {} ({})", block.number, block.hash),
            None => println!("Block:       pending"),
        }
        println!("Call:        {} [{}]", call.signature, call.selector());
        for (i, arg) in args_text.iter().enumerate() {
            println!("  {}: {}", i, arg);
        }
    }
    Ok(ExitCode::SUCCESS)
}
