//! List command implementation

use anyhow::{Context, Result};
use with_namespace::ProcScanner;

pub fn execute() -> Result<i32> {
    tracing::info!("Listing namespace holders");

    let holders = ProcScanner::default()
        .holders()
        .context("Failed to scan processes")?;

    for holder in &holders {
        println!("{}\t{}", holder.pid, holder.command);
    }
    tracing::debug!(count = holders.len(), "Listed namespace holders");

    Ok(0)
}
