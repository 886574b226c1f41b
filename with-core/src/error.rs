//! Error types for With

use std::path::PathBuf;

use thiserror::Error;

/// With error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed or evaluated
    #[error("Failed to load config {}: {message}", path.display())]
    Config {
        /// File that failed to load
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Loaded configuration is inconsistent
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// A requested profile is absent from the loaded configuration
    #[error("Profile not found: {name}")]
    ProfileNotFound {
        /// Name of the missing profile
        name: String,
    },

    /// An augmentation is missing its `=` separator
    #[error("Malformed augmentation '{value}': expected VIRTUAL=SOURCE")]
    MalformedAugmentation {
        /// Raw command-line value
        value: String,
    },

    /// Invalid command-line input
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message
        message: String,
    },

    /// The namespace executor reported a failure
    #[error("Executor error: {message}")]
    Executor {
        /// Error message
        message: String,
    },

    /// System error from nix
    #[error("System error: {0}")]
    System(#[from] nix::Error),

    /// Malformed JSON exchanged with the executor
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for With operations
pub type Result<T> = std::result::Result<T, Error>;
