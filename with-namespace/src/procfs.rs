//! Enumeration of processes running inside a `with` namespace
//!
//! This is a best-effort snapshot: a process that exits while being
//! inspected is simply not reported.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;
use with_core::{ProcessId, Result};

use crate::NAMESPACE_ROOT;

/// Default procfs mount point
pub const PROC_ROOT: &str = "/proc";

/// A process holding a `with` namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceHolder {
    /// Process ID
    pub pid: ProcessId,
    /// Command line, space separated
    pub command: String,
}

/// Scans a procfs tree for namespace holders
#[derive(Debug, Clone)]
pub struct ProcScanner {
    root: PathBuf,
}

impl Default for ProcScanner {
    fn default() -> Self {
        Self::new(PROC_ROOT)
    }
}

impl ProcScanner {
    /// Create a scanner for a procfs mount point
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List processes whose mount namespace differs from ours and exposes
    /// the namespace root, sorted by PID
    ///
    /// # Errors
    /// Returns error if the procfs root itself cannot be read
    pub fn holders(&self) -> Result<Vec<NamespaceHolder>> {
        let own_mnt = mount_namespace(&self.root.join("self"));
        let mut holders = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let Ok(entry) = entry else { continue };
            let name = entry.file_name();
            let Some(pid) = name.to_str().and_then(|s| s.parse::<ProcessId>().ok()) else {
                continue;
            };

            if let Some(holder) = inspect(pid, &entry.path(), own_mnt.as_deref()) {
                holders.push(holder);
            }
        }

        holders.sort_by_key(|holder| holder.pid);
        Ok(holders)
    }
}

fn inspect(pid: ProcessId, dir: &Path, own_mnt: Option<&str>) -> Option<NamespaceHolder> {
    let mnt = mount_namespace(dir)?;
    if Some(mnt.as_str()) == own_mnt {
        return None;
    }

    let root = dir.join("root").join(NAMESPACE_ROOT.trim_start_matches('/'));
    if !root.is_dir() {
        trace!(pid = %pid, "no namespace root");
        return None;
    }

    Some(NamespaceHolder {
        pid,
        command: command_line(dir),
    })
}

fn mount_namespace(dir: &Path) -> Option<String> {
    fs::read_link(dir.join("ns").join("mnt"))
        .ok()
        .map(|link| link.to_string_lossy().into_owned())
}

fn command_line(dir: &Path) -> String {
    let raw = fs::read(dir.join("cmdline")).unwrap_or_default();
    let words: Vec<String> = raw
        .split(|&b| b == 0)
        .filter(|word| !word.is_empty())
        .map(|word| String::from_utf8_lossy(word).into_owned())
        .collect();

    if words.is_empty() {
        "?".to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    fn fake_process(root: &Path, name: &str, mnt: Option<&str>, with_root: bool, cmdline: &[u8]) {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("ns")).unwrap();
        if let Some(mnt) = mnt {
            symlink(mnt, dir.join("ns").join("mnt")).unwrap();
        }
        if with_root {
            fs::create_dir_all(dir.join("root").join("with")).unwrap();
        }
        fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    #[test]
    fn test_holders() {
        let proc_dir = tempfile::tempdir().unwrap();
        let root = proc_dir.path();

        fake_process(root, "self", Some("mnt:[1]"), true, b"with\0--list\0");
        fake_process(root, "300", Some("mnt:[2]"), true, b"sleep\0100\0");
        fake_process(root, "20", Some("mnt:[3]"), true, b"");
        fake_process(root, "456", Some("mnt:[1]"), true, b"bash\0");
        fake_process(root, "457", Some("mnt:[4]"), false, b"other\0");
        fake_process(root, "789", None, true, b"gone\0");
        fs::create_dir(root.join("sys")).unwrap();

        let holders = ProcScanner::new(root).holders().unwrap();
        assert_eq!(
            holders,
            vec![
                NamespaceHolder {
                    pid: ProcessId::from_raw(20),
                    command: "?".to_string(),
                },
                NamespaceHolder {
                    pid: ProcessId::from_raw(300),
                    command: "sleep 100".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_proc_root() {
        assert!(ProcScanner::new("/nonexistent/proc").holders().is_err());
    }
}
