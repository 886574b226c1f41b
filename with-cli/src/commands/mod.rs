use anyhow::Result;
use with_namespace::{NamespaceExecutor, RenderMode};

use crate::cli::{Action, Cli};

pub mod build;
pub mod list;
pub mod profiles;
pub mod show;

/// Dispatch to the handler for the selected action, returning the exit status
pub fn dispatch(cli: &Cli, executor: &dyn NamespaceExecutor) -> Result<i32> {
    let action = cli.action();
    tracing::debug!(?action, "Dispatching");

    match action {
        Action::Show(pid) => show::execute(executor, pid, RenderMode::Show),
        Action::Clone(pid) => show::execute(executor, pid, RenderMode::Clone),
        Action::List => list::execute(),
        Action::Profiles => profiles::execute(),
        Action::Build => build::execute(cli, executor),
    }
}
