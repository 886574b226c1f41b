//! Namespace specification engine
//!
//! This crate derives the specification a namespace is built from:
//! - Merger - precedence-aware recursive merge of specifications
//! - Builder - path strings and native executor trees to specifications
//! - Render - human-readable and command-line-reconstructible output
//! - Config - profile loading from the system and user config files
//! - Executor - the collaborator that performs the actual isolation
//! - Compose - import, profiles and augmentations into one request
//! - Procfs - processes currently holding a namespace

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod builder;
pub mod compose;
pub mod config;
pub mod executor;
pub mod merge;
pub mod procfs;
pub mod render;

pub use builder::{native_to_spec, path_to_tree};
pub use compose::{BuildOptions, Composer};
pub use config::{ConfigLoader, Profiles};
pub use executor::{ExecOutcome, HelperExecutor, MockExecutor, NamespaceExecutor};
pub use merge::{merge, merge_into};
pub use procfs::{NamespaceHolder, ProcScanner};
pub use render::{RenderMode, render};

/// Conventional mount point of the virtual namespace
pub const NAMESPACE_ROOT: &str = "/with";
