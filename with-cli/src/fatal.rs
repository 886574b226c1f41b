//! Termination strategy for fatal errors

use std::ffi::OsString;

use with_namespace::NamespaceExecutor;
use with_namespace::executor::exec_command;

/// Exit status for any reported failure
pub const FAILURE: i32 = 1;

/// Flag selecting [`OnFatal::FallbackShell`]; only honoured as the first argument
pub const EXEC_FALLBACK_FLAG: &str = "--exec-fallback";

/// A failure that ends the invocation
#[derive(Debug)]
pub enum Fatal {
    /// Already printed (usage errors, help output)
    Reported,
    /// Still to be printed
    Error(anyhow::Error),
}

impl From<anyhow::Error> for Fatal {
    fn from(e: anyhow::Error) -> Self {
        Self::Error(e)
    }
}

/// What to do once a fatal error has been reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFatal {
    /// Exit with [`FAILURE`]
    Exit,
    /// Replace the process with an interactive shell, for use when `with`
    /// was exec'd in place of a login shell
    FallbackShell,
}

impl OnFatal {
    /// Select the strategy from the raw arguments (program name first)
    pub fn from_args(args: &[OsString]) -> Self {
        if args.get(1).and_then(|arg| arg.to_str()) == Some(EXEC_FALLBACK_FLAG) {
            Self::FallbackShell
        } else {
            Self::Exit
        }
    }

    /// Report `fatal` and terminate according to the strategy, returning the
    /// exit status when the process is not replaced
    pub fn handle(self, fatal: Fatal, executor: &dyn NamespaceExecutor) -> i32 {
        if let Fatal::Error(e) = fatal {
            eprintln!("❌ Error: {e:#}");
        }

        match self {
            Self::Exit => FAILURE,
            Self::FallbackShell => {
                let shell = executor.default_shell();
                eprintln!("Falling back to {}", shell.join(" "));
                match exec_command(&shell) {
                    Ok(never) => match never {},
                    Err(e) => {
                        eprintln!("❌ Error: {e}");
                        FAILURE
                    }
                }
            }
        }
    }
}
