//! With - run commands inside a composed virtual filesystem namespace
//!
//! The namespace is built from the current one, named profiles and
//! command-line augmentations, then handed to the namespace executor.

use std::ffi::OsString;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;
use with_namespace::{HelperExecutor, NamespaceExecutor};

mod cli;
mod commands;
mod fatal;

use cli::Cli;
use fatal::{EXEC_FALLBACK_FLAG, Fatal, OnFatal};

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    let on_fatal = OnFatal::from_args(&args);
    let executor = HelperExecutor::from_env();

    let code = match run(args, on_fatal, &executor) {
        Ok(code) => code,
        Err(fatal) => on_fatal.handle(fatal, &executor),
    };

    process::exit(code);
}

fn run(args: Vec<OsString>, on_fatal: OnFatal, executor: &dyn NamespaceExecutor) -> Result<i32, Fatal> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            e.print().ok();
            return Ok(0);
        }
        Err(e) => {
            // Help output counts as a failure too
            e.print().ok();
            return Err(Fatal::Reported);
        }
    };

    init_logging(cli.verbose);

    if cli.exec_fallback && on_fatal != OnFatal::FallbackShell {
        return Err(Fatal::Error(anyhow::anyhow!(
            "{EXEC_FALLBACK_FLAG} is only valid as the first argument"
        )));
    }

    Ok(commands::dispatch(&cli, executor)?)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
