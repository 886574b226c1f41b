//! Default action: build the namespace and run the command in it

use anyhow::Result;
use with_core::{Augmentation, ProcessId};
use with_namespace::{BuildOptions, Composer, ConfigLoader, ExecOutcome, NamespaceExecutor, Profiles};

use crate::cli::Cli;

pub fn execute(cli: &Cli, executor: &dyn NamespaceExecutor) -> Result<i32> {
    let home = std::env::var("HOME").ok();
    let augmentations = cli
        .augment
        .iter()
        .map(|raw| Augmentation::parse(raw, home.as_deref()))
        .collect::<with_core::Result<Vec<_>>>()?;

    let profiles = load_profiles(&ConfigLoader::from_env());

    let options = BuildOptions {
        import: (!cli.no_import).then(ProcessId::current),
        profiles: cli.profile.clone(),
        augmentations,
        command: cli.command(),
        dry_run: cli.dry_run,
    };

    match Composer::new(executor, &profiles).run(&options)? {
        ExecOutcome::DryRun(rendered) => {
            println!("{rendered}");
            Ok(0)
        }
        ExecOutcome::Exited(code) => {
            tracing::info!(code, "Command exited");
            Ok(code)
        }
    }
}

/// Load profiles; files that fail to load are logged by the loader and
/// skipped
pub fn load_profiles(loader: &ConfigLoader) -> Profiles {
    let (profiles, errors) = loader.load();

    if !errors.is_empty() {
        tracing::error!(
            failed = errors.len(),
            loaded = profiles.len(),
            "Continuing with the profiles that loaded"
        );
    }

    profiles
}
