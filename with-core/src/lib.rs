//! With Core - Foundation types for namespace specifications
//!
//! This crate provides the data model shared by the specification engine and
//! the command-line front end: specification trees, the executor's native
//! tree entries, augmentations and exec requests.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use tree::{Node, Specification, TreeEntry};
pub use types::{Augmentation, ExecRequest, ProcessId};
