//! Namespace composition
//!
//! Precedence, lowest first: the imported namespace, then profiles in the
//! order requested, then command-line augmentations in the order given.

use tracing::{debug, info};
use with_core::{Augmentation, ExecRequest, ProcessId, Result, Specification};

use crate::builder::{augmentation_to_tree, native_to_spec};
use crate::config::Profiles;
use crate::executor::{ExecOutcome, NamespaceExecutor};
use crate::merge::merge_into;

/// Inputs of the default build action
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Process whose namespace is imported; `None` starts empty
    pub import: Option<ProcessId>,
    /// Profile names, lowest precedence first
    pub profiles: Vec<String>,
    /// Command-line augmentations, lowest precedence first
    pub augmentations: Vec<Augmentation>,
    /// Command to run; empty selects the executor's default shell
    pub command: Vec<String>,
    /// Ask the executor to render instead of run
    pub dry_run: bool,
}

/// Builds specifications and exec requests against one executor
pub struct Composer<'a, E: NamespaceExecutor + ?Sized> {
    executor: &'a E,
    profiles: &'a Profiles,
}

impl<'a, E: NamespaceExecutor + ?Sized> Composer<'a, E> {
    /// Create a composer
    #[must_use]
    pub const fn new(executor: &'a E, profiles: &'a Profiles) -> Self {
        Self { executor, profiles }
    }

    /// Compute the final specification
    ///
    /// Every profile is resolved before the executor is consulted, so an
    /// unknown profile fails without side effects.
    pub fn specification(&self, options: &BuildOptions) -> Result<Specification> {
        let resolved = options
            .profiles
            .iter()
            .map(|name| self.profiles.resolve(name))
            .collect::<Result<Vec<_>>>()?;

        let mut spec = match options.import {
            Some(pid) => {
                debug!(pid = %pid, "Importing namespace");
                native_to_spec(&self.executor.query_namespace(pid)?)
            }
            None => Specification::new(),
        };

        for (name, profile) in options.profiles.iter().zip(&resolved) {
            debug!(profile = %name, "Applying profile");
            merge_into(&mut spec, profile);
        }

        for augmentation in &options.augmentations {
            debug!(augmentation = %augmentation, "Applying augmentation");
            merge_into(&mut spec, &augmentation_to_tree(augmentation));
        }

        Ok(spec)
    }

    /// Assemble the request handed to the executor
    pub fn request(&self, options: &BuildOptions) -> Result<ExecRequest> {
        let namespace = self.specification(options)?;
        let cmd = if options.command.is_empty() {
            self.executor.default_shell()
        } else {
            options.command.clone()
        };

        Ok(ExecRequest {
            cmd,
            namespace,
            dry_run: options.dry_run,
        })
    }

    /// Build the request and delegate it to the executor
    pub fn run(&self, options: &BuildOptions) -> Result<ExecOutcome> {
        let request = self.request(options)?;
        info!(
            command = %request.cmd.join(" "),
            entries = request.namespace.len(),
            dry_run = request.dry_run,
            "Executing"
        );
        self.executor.execute(request)
    }
}
