//! Show and clone command implementation

use anyhow::{Context, Result};
use with_core::ProcessId;
use with_namespace::{NamespaceExecutor, RenderMode, render};

pub fn execute(executor: &dyn NamespaceExecutor, pid: Option<ProcessId>, mode: RenderMode) -> Result<i32> {
    let target_pid = pid.unwrap_or_else(ProcessId::current);
    tracing::info!(pid = %target_pid, ?mode, "Rendering namespace");

    let tree = executor
        .query_namespace(target_pid)
        .with_context(|| format!("Failed to query namespace of PID {target_pid}"))?;

    match mode {
        RenderMode::Show => print!("{}", render(&tree, mode)),
        RenderMode::Clone => println!("{}", render(&tree, mode)),
    }

    Ok(0)
}
