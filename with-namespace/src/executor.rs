//! Namespace executor collaborator
//!
//! The executor performs the OS-level work: it reports the namespace tree a
//! process runs in and builds a namespace from a specification before
//! running a command inside it. [`HelperExecutor`] delegates to an external
//! helper program; [`MockExecutor`] records requests in memory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::ffi::CString;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};
use with_core::{Error, ExecRequest, ProcessId, Result, TreeEntry};

/// Result of handing a request to the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The command ran and exited with this status
    Exited(i32),
    /// Dry run: the command line that would have been executed
    DryRun(String),
}

/// Trait for namespace executors
pub trait NamespaceExecutor {
    /// Native namespace tree of a process
    ///
    /// # Errors
    /// Returns error if the process cannot be inspected
    fn query_namespace(&self, pid: ProcessId) -> Result<Vec<TreeEntry>>;

    /// Command run when the caller gives none
    fn default_shell(&self) -> Vec<String>;

    /// Build the namespace and run the command in it
    ///
    /// # Errors
    /// Returns error if the namespace cannot be built or the command started
    fn execute(&self, request: ExecRequest) -> Result<ExecOutcome>;
}

/// Executor backed by an external helper program
///
/// - `helper query <pid>` prints the native tree as JSON
/// - `helper exec <request-json>` builds the namespace and execs the command
#[derive(Debug, Clone)]
pub struct HelperExecutor {
    program: PathBuf,
}

impl HelperExecutor {
    /// Environment variable naming the helper program
    pub const PROGRAM_ENV: &'static str = "WITH_EXECUTOR";

    /// Helper looked up on `PATH` when the variable is unset
    pub const DEFAULT_PROGRAM: &'static str = "with-exec";

    /// Create an executor for an explicit helper program
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Create an executor from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var_os(Self::PROGRAM_ENV).unwrap_or_else(|| Self::DEFAULT_PROGRAM.into()))
    }

    /// Helper command line for a request
    ///
    /// # Errors
    /// Returns error if the request cannot be serialized
    pub fn command_line(&self, request: &ExecRequest) -> Result<Vec<String>> {
        Ok(vec![
            self.program.to_string_lossy().into_owned(),
            "exec".to_string(),
            serde_json::to_string(request)?,
        ])
    }
}

impl NamespaceExecutor for HelperExecutor {
    fn query_namespace(&self, pid: ProcessId) -> Result<Vec<TreeEntry>> {
        debug!(pid = %pid, program = %self.program.display(), "Querying namespace");

        let output = Command::new(&self.program)
            .arg("query")
            .arg(pid.to_string())
            .output()
            .map_err(|e| Error::Executor {
                message: format!("failed to run {}: {e}", self.program.display()),
            })?;

        if !output.status.success() {
            return Err(Error::Executor {
                message: format!(
                    "query for PID {pid} failed ({}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        TreeEntry::parse_native(&String::from_utf8_lossy(&output.stdout))
    }

    fn default_shell(&self) -> Vec<String> {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        vec![shell, "-i".to_string()]
    }

    fn execute(&self, request: ExecRequest) -> Result<ExecOutcome> {
        let command = self.command_line(&request)?;

        if request.dry_run {
            return Ok(ExecOutcome::DryRun(shell_words::join(&command)));
        }

        info!(command = %request.cmd.join(" "), "Handing request to executor");
        match exec_command(&command)? {}
    }
}

/// Replace the current process image with `command`
///
/// Only returns on failure.
///
/// # Errors
/// Returns error if the command is empty, contains NUL bytes or cannot be
/// executed
pub fn exec_command(command: &[String]) -> Result<Infallible> {
    let Some(program) = command.first() else {
        return Err(Error::InvalidInput {
            message: "Command cannot be empty".to_string(),
        });
    };

    let args: Vec<CString> = command
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::InvalidInput {
            message: format!("Invalid argument: {e}"),
        })?;

    debug!(program = %program, "Calling execvp");
    let Err(e) = nix::unistd::execvp(&args[0], &args);
    Err(Error::Executor {
        message: format!("failed to execute {program}: {e}"),
    })
}

/// In-memory executor for tests
///
/// Namespaces are registered per PID; executed requests are recorded and
/// report exit status 0.
#[derive(Debug, Default)]
pub struct MockExecutor {
    namespaces: HashMap<ProcessId, Vec<TreeEntry>>,
    shell: Vec<String>,
    requests: RefCell<Vec<ExecRequest>>,
}

impl MockExecutor {
    /// Create a mock executor whose default shell is `/bin/sh -i`
    #[must_use]
    pub fn new() -> Self {
        Self {
            shell: vec!["/bin/sh".to_string(), "-i".to_string()],
            ..Self::default()
        }
    }

    /// Register the native tree reported for `pid`
    #[must_use]
    pub fn with_namespace(mut self, pid: ProcessId, tree: Vec<TreeEntry>) -> Self {
        self.namespaces.insert(pid, tree);
        self
    }

    /// Requests executed so far
    #[must_use]
    pub fn requests(&self) -> Vec<ExecRequest> {
        self.requests.borrow().clone()
    }
}

impl NamespaceExecutor for MockExecutor {
    fn query_namespace(&self, pid: ProcessId) -> Result<Vec<TreeEntry>> {
        self.namespaces
            .get(&pid)
            .cloned()
            .ok_or_else(|| Error::Executor {
                message: format!("no namespace for PID {pid}"),
            })
    }

    fn default_shell(&self) -> Vec<String> {
        self.shell.clone()
    }

    fn execute(&self, request: ExecRequest) -> Result<ExecOutcome> {
        let outcome = if request.dry_run {
            ExecOutcome::DryRun(serde_json::to_string(&request)?)
        } else {
            ExecOutcome::Exited(0)
        };
        self.requests.borrow_mut().push(request);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use with_core::Specification;

    fn request(dry_run: bool) -> ExecRequest {
        ExecRequest {
            cmd: vec!["ls".to_string()],
            namespace: Specification::new(),
            dry_run,
        }
    }

    #[test]
    fn test_helper_command_line() {
        let executor = HelperExecutor::new("/usr/libexec/with-exec");
        let line = executor.command_line(&request(false)).unwrap();

        assert_eq!(line[0], "/usr/libexec/with-exec");
        assert_eq!(line[1], "exec");
        assert_eq!(line[2], r#"{"cmd":["ls"],"namespace":{},"dry_run":false}"#);
    }

    #[test]
    fn test_helper_dry_run_does_not_exec() {
        let executor = HelperExecutor::new("with-exec");
        let ExecOutcome::DryRun(rendered) = executor.execute(request(true)).unwrap() else {
            panic!("dry run executed the request");
        };

        assert_eq!(
            shell_words::split(&rendered).unwrap(),
            vec![
                "with-exec",
                "exec",
                r#"{"cmd":["ls"],"namespace":{},"dry_run":true}"#,
            ]
        );
    }

    #[test]
    fn test_helper_query_missing_program() {
        let executor = HelperExecutor::new("/nonexistent/with-exec");
        let err = executor
            .query_namespace(ProcessId::from_raw(1))
            .unwrap_err();
        assert!(matches!(err, Error::Executor { .. }));
    }

    #[test]
    fn test_exec_command_rejects_empty() {
        assert!(exec_command(&[]).is_err());
    }

    #[test]
    fn test_mock_records_requests() {
        let executor = MockExecutor::new();
        assert_eq!(executor.default_shell(), vec!["/bin/sh", "-i"]);

        let outcome = executor.execute(request(false)).unwrap();
        assert_eq!(outcome, ExecOutcome::Exited(0));
        assert_eq!(executor.requests().len(), 1);
    }

    #[test]
    fn test_mock_query() {
        let pid = ProcessId::from_raw(7);
        let tree = vec![TreeEntry::Leaf {
            from: "tmp".to_string(),
            to: "/tmp".to_string(),
        }];
        let executor = MockExecutor::new().with_namespace(pid, tree.clone());

        assert_eq!(executor.query_namespace(pid).unwrap(), tree);
        assert!(executor.query_namespace(ProcessId::from_raw(8)).is_err());
    }
}
