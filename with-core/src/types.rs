//! Core type definitions with strong typing and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result, Specification};

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Create from raw PID
    #[must_use]
    pub const fn from_raw(pid: i32) -> Self {
        Self(pid)
    }

    /// Get the current process ID
    #[must_use]
    pub fn current() -> Self {
        Self::from(nix::unistd::getpid())
    }

    /// Get raw PID value
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(Self(pid)),
            _ => Err(Error::InvalidInput {
                message: format!("'{s}' is not a process ID"),
            }),
        }
    }
}

impl From<nix::unistd::Pid> for ProcessId {
    fn from(pid: nix::unistd::Pid) -> Self {
        Self(pid.as_raw())
    }
}

/// One command-line override mapping a virtual path onto a source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Augmentation {
    /// `/`-separated path below the namespace root
    pub virtual_path: String,
    /// Real path it resolves to
    pub source_path: String,
}

impl Augmentation {
    /// Parse a `VIRTUAL=SOURCE` value
    ///
    /// Every `~` is replaced by `home` (when known) before splitting on the
    /// first `=`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedAugmentation`] if there is no `=`
    pub fn parse(raw: &str, home: Option<&str>) -> Result<Self> {
        let expanded = match home {
            Some(home) => raw.replace('~', home),
            None => raw.to_string(),
        };

        let (virtual_path, source_path) =
            expanded
                .split_once('=')
                .ok_or_else(|| Error::MalformedAugmentation {
                    value: raw.to_string(),
                })?;

        Ok(Self {
            virtual_path: virtual_path.to_string(),
            source_path: source_path.to_string(),
        })
    }
}

impl fmt::Display for Augmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.virtual_path, self.source_path)
    }
}

/// Unit of work handed to the namespace executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Command and arguments to run inside the namespace
    pub cmd: Vec<String>,
    /// Final namespace specification
    pub namespace: Specification,
    /// Render the request instead of running it
    pub dry_run: bool,
}
