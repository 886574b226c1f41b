//! CLI argument definitions

use clap::{ArgGroup, Parser};
use with_core::ProcessId;

#[derive(Parser, Debug)]
#[command(name = "with")]
#[command(about = "Run a command inside a composed /with namespace", long_about = None)]
#[command(version)]
#[command(group(
    ArgGroup::new("tool")
        .args(["show", "showpid", "clone", "clonepid", "list", "profiles"])
        .multiple(false)
))]
pub struct Cli {
    /// Mount SOURCE at VIRTUAL below /with (repeatable)
    #[arg(short = 'a', long = "augment", value_name = "VIRTUAL=SOURCE", help_heading = "Namespace")]
    pub augment: Vec<String>,

    /// Apply a profile from the config files (repeatable, in order)
    #[arg(short = 'p', long = "profile", value_name = "NAME", help_heading = "Namespace")]
    pub profile: Vec<String>,

    /// Start from an empty namespace instead of the current one
    #[arg(short = 'n', long = "no-import", help_heading = "Namespace")]
    pub no_import: bool,

    /// Show the current namespace
    #[arg(long = "show", help_heading = "Tools")]
    pub show: bool,

    /// Show the namespace of another process
    #[arg(long = "showpid", value_name = "PID", help_heading = "Tools")]
    pub showpid: Option<ProcessId>,

    /// Print flags that recreate the current namespace
    #[arg(long = "clone", help_heading = "Tools")]
    pub clone: bool,

    /// Print flags that recreate another process's namespace
    #[arg(long = "clonepid", value_name = "PID", help_heading = "Tools")]
    pub clonepid: Option<ProcessId>,

    /// List processes running in a namespace
    #[arg(long = "list", help_heading = "Tools")]
    pub list: bool,

    /// List available profiles
    #[arg(short = 'l', long = "profiles", help_heading = "Tools")]
    pub profiles: bool,

    /// Print the executor invocation instead of running it
    #[arg(long = "dry-run", help_heading = "Debugging")]
    pub dry_run: bool,

    /// Fall back to an interactive shell on failure (first argument only)
    #[arg(long = "exec-fallback", help_heading = "Debugging")]
    pub exec_fallback: bool,

    /// Enable verbose logging
    #[arg(short, long, help_heading = "Debugging")]
    pub verbose: bool,

    /// Command to run (default: interactive shell)
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// Introspection action or the default build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print a namespace tree
    Show(Option<ProcessId>),
    /// Print flags recreating a namespace tree
    Clone(Option<ProcessId>),
    /// List namespace holders
    List,
    /// List profiles
    Profiles,
    /// Build a namespace and run the command
    Build,
}

impl Cli {
    /// The single action selected by the flags
    pub fn action(&self) -> Action {
        if self.show || self.showpid.is_some() {
            Action::Show(self.showpid)
        } else if self.clone || self.clonepid.is_some() {
            Action::Clone(self.clonepid)
        } else if self.list {
            Action::List
        } else if self.profiles {
            Action::Profiles
        } else {
            Action::Build
        }
    }

    /// Command to run, with a leading bare `--` dropped
    pub fn command(&self) -> Vec<String> {
        let skip = usize::from(self.command.first().is_some_and(|word| word == "--"));
        self.command[skip..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("with").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_build_flags() {
        let cli = parse(&["-a", "a/b=/usr/bin", "--augment", "c=/tmp", "-p", "dev", "-n"]);

        assert_eq!(cli.augment, vec!["a/b=/usr/bin", "c=/tmp"]);
        assert_eq!(cli.profile, vec!["dev"]);
        assert!(cli.no_import);
        assert_eq!(cli.action(), Action::Build);
        assert!(cli.command().is_empty());
    }

    #[test]
    fn test_command_keeps_its_flags() {
        let cli = parse(&["-n", "ls", "-l", "-a"]);
        assert_eq!(cli.command(), vec!["ls", "-l", "-a"]);
        assert!(cli.augment.is_empty());
    }

    #[test]
    fn test_double_dash_ignored() {
        assert_eq!(parse(&["--", "ls", "-l"]).command(), vec!["ls", "-l"]);
        assert_eq!(parse(&["--", "--", "ls"]).command(), vec!["ls"]);
    }

    #[test]
    fn test_actions() {
        assert_eq!(parse(&["--show"]).action(), Action::Show(None));
        assert_eq!(
            parse(&["--showpid=12"]).action(),
            Action::Show(Some(ProcessId::from_raw(12)))
        );
        assert_eq!(parse(&["--clone"]).action(), Action::Clone(None));
        assert_eq!(
            parse(&["--clonepid", "9"]).action(),
            Action::Clone(Some(ProcessId::from_raw(9)))
        );
        assert_eq!(parse(&["--list"]).action(), Action::List);
        assert_eq!(parse(&["-l"]).action(), Action::Profiles);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["with", "-n", "--dry-run", "--profil", "dev"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);

        assert!(Cli::try_parse_from(["with", "--bogus", "ls"]).is_err());
    }

    #[test]
    fn test_tools_are_exclusive() {
        assert!(Cli::try_parse_from(["with", "--show", "--list"]).is_err());
        assert!(Cli::try_parse_from(["with", "--showpid", "abc"]).is_err());
    }
}
