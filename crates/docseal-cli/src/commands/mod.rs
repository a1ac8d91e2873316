//! CLI subcommands.

pub mod attest;
pub mod records;
pub mod selector;
pub mod show;
pub mod tx;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use docseal::Kernel;

use crate::config::CliConfig;

/// Build a kernel from the configuration at `path` (or the defaults).
pub fn kernel(path: Option<&Path>) -> Result<Kernel> {
    CliConfig::resolve(path)?.build_kernel()
}

/// Read a JSON file holding one object or an array of objects.
pub async fn read_json_items(path: &Path) -> Result<Vec<Value>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
