//! Profile configuration
//!
//! Profiles are declared in TOML. Every top-level table is one profile;
//! nested tables are sub-trees and strings are source paths:
//!
//! ```toml
//! [dev]
//! inherit = ["base"]
//! tmp = "~/scratch"
//!
//! [dev.bin]
//! ls = "/bin/ls"
//! ```
//!
//! The system file is read first and the user file merges over it.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use with_core::{Error, Node, Result, Specification};

use crate::merge::merge_into;

/// System-wide configuration file, always consulted
pub const SYSTEM_CONFIG: &str = "/etc/withrc";

/// Environment variable overriding the user configuration path
pub const USER_CONFIG_ENV: &str = "WITHRC";

/// User configuration file name below `HOME`
pub const USER_CONFIG_NAME: &str = ".withrc";

/// Reserved profile key listing the profiles to build on
pub const INHERIT_KEY: &str = "inherit";

/// One named profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Profiles merged underneath this one, in order
    pub inherit: Vec<String>,
    /// The profile's own tree
    pub tree: Specification,
}

/// Profiles loaded for one invocation, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profiles {
    entries: BTreeMap<String, Profile>,
}

impl Profiles {
    /// Create an empty profile set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    ///
    /// `path` is only used for error reporting. A leading `~` in a source
    /// path is replaced by `home`.
    pub fn parse(path: &Path, contents: &str, home: Option<&str>) -> Result<Self> {
        let config_error = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };

        let table: toml::Table = toml::from_str(contents).map_err(|e| config_error(e.to_string()))?;

        let mut entries = BTreeMap::new();
        for (name, value) in table {
            let toml::Value::Table(body) = value else {
                return Err(config_error(format!("profile '{name}' must be a table")));
            };
            let profile = parse_profile(&name, body, home).map_err(config_error)?;
            entries.insert(name, profile);
        }

        Ok(Self { entries })
    }

    /// Add or replace a profile
    pub fn insert(&mut self, name: impl Into<String>, profile: Profile) {
        self.entries.insert(name.into(), profile);
    }

    /// Merge `other` over this set
    ///
    /// Profiles with the same name are merged with the namespace merge rule;
    /// a non-empty `inherit` list in `other` replaces the existing one.
    pub fn merge_from(&mut self, other: Self) {
        for (name, incoming) in other.entries {
            match self.entries.get_mut(&name) {
                Some(existing) => {
                    merge_into(&mut existing.tree, &incoming.tree);
                    if !incoming.inherit.is_empty() {
                        existing.inherit = incoming.inherit;
                    }
                }
                None => {
                    self.entries.insert(name, incoming);
                }
            }
        }
    }

    /// Profile names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Look up a profile without resolving inheritance
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.entries.get(name)
    }

    /// Number of profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no profiles are loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a profile to its specification, applying inherited profiles
    /// first
    pub fn resolve(&self, name: &str) -> Result<Specification> {
        let mut stack = Vec::new();
        self.resolve_inner(name, &mut stack)
    }

    fn resolve_inner<'a>(&'a self, name: &'a str, stack: &mut Vec<&'a str>) -> Result<Specification> {
        let profile = self.entries.get(name).ok_or_else(|| Error::ProfileNotFound {
            name: name.to_string(),
        })?;

        if stack.contains(&name) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "profile inheritance cycle: {} -> {name}",
                    stack.join(" -> ")
                ),
            });
        }

        stack.push(name);
        let mut spec = Specification::new();
        for parent in &profile.inherit {
            let inherited = self.resolve_inner(parent, stack)?;
            merge_into(&mut spec, &inherited);
        }
        stack.pop();

        merge_into(&mut spec, &profile.tree);
        Ok(spec)
    }
}

fn parse_profile(
    name: &str,
    body: toml::Table,
    home: Option<&str>,
) -> std::result::Result<Profile, String> {
    let mut profile = Profile::default();

    for (key, value) in body {
        if key == INHERIT_KEY {
            profile.inherit = parse_inherit(name, value)?;
            continue;
        }
        let node = parse_node(&format!("{name}.{key}"), value, home)?;
        profile.tree.insert(key, node);
    }

    Ok(profile)
}

fn parse_inherit(name: &str, value: toml::Value) -> std::result::Result<Vec<String>, String> {
    let invalid = || format!("'{name}.{INHERIT_KEY}' must be an array of profile names");

    let toml::Value::Array(items) = value else {
        return Err(invalid());
    };
    items
        .into_iter()
        .map(|item| match item {
            toml::Value::String(parent) => Ok(parent),
            _ => Err(invalid()),
        })
        .collect()
}

fn parse_node(key_path: &str, value: toml::Value, home: Option<&str>) -> std::result::Result<Node, String> {
    match value {
        toml::Value::String(source) => Ok(Node::Leaf(expand_home(&source, home))),
        toml::Value::Table(table) => {
            let mut tree = Specification::new();
            for (key, value) in table {
                let node = parse_node(&format!("{key_path}.{key}"), value, home)?;
                tree.insert(key, node);
            }
            Ok(Node::Tree(tree))
        }
        other => Err(format!(
            "'{key_path}' must be a path string or a table, found {}",
            other.type_str()
        )),
    }
}

fn expand_home(source: &str, home: Option<&str>) -> String {
    match (source.strip_prefix('~'), home) {
        (Some(rest), Some(home)) => format!("{home}{rest}"),
        _ => source.to_string(),
    }
}

/// Loads and merges the system and user configuration files
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    system_path: PathBuf,
    user_path: Option<PathBuf>,
    home: Option<String>,
}

impl ConfigLoader {
    /// Create a loader for explicit paths
    #[must_use]
    pub fn new(system_path: impl Into<PathBuf>, user_path: Option<PathBuf>, home: Option<String>) -> Self {
        Self {
            system_path: system_path.into(),
            user_path,
            home,
        }
    }

    /// Create a loader from the process environment
    ///
    /// The user file is `$WITHRC`, falling back to `$HOME/.withrc`.
    #[must_use]
    pub fn from_env() -> Self {
        let home = std::env::var("HOME").ok();
        let user_path = std::env::var_os(USER_CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|home| Path::new(home).join(USER_CONFIG_NAME)));

        Self::new(SYSTEM_CONFIG, user_path, home)
    }

    /// Configuration files in load order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.system_path.as_path()).chain(self.user_path.as_deref())
    }

    /// Load every configuration file
    ///
    /// A missing file is skipped. A file that fails to read or parse
    /// contributes nothing; its error is returned alongside the profiles
    /// that did load.
    #[must_use]
    pub fn load(&self) -> (Profiles, Vec<Error>) {
        let mut profiles = Profiles::new();
        let mut errors = Vec::new();

        for path in self.paths() {
            match self.load_file(path) {
                Ok(Some(loaded)) => {
                    info!(path = %path.display(), count = loaded.len(), "Loaded profiles");
                    profiles.merge_from(loaded);
                }
                Ok(None) => debug!(path = %path.display(), "Config file not present"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config file rejected");
                    errors.push(e);
                }
            }
        }

        (profiles, errors)
    }

    fn load_file(&self, path: &Path) -> Result<Option<Profiles>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        Profiles::parse(path, &contents, self.home.as_deref()).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn spec(value: Value) -> Specification {
        Specification::from_json(value).unwrap()
    }

    fn parse(contents: &str) -> Result<Profiles> {
        Profiles::parse(Path::new("test.toml"), contents, Some("/home/u"))
    }

    #[test]
    fn test_parse_profiles() {
        let profiles = parse(
            r#"
            [dev]
            tmp = "/tmp"

            [dev.bin]
            ls = "/bin/ls"

            [empty]
            "#,
        )
        .unwrap();

        assert_eq!(profiles.names().collect::<Vec<_>>(), vec!["dev", "empty"]);
        assert_eq!(
            profiles.resolve("dev").unwrap(),
            spec(json!({"tmp": "/tmp", "bin": {"ls": "/bin/ls"}}))
        );
        assert!(profiles.resolve("empty").unwrap().is_empty());
    }

    #[test]
    fn test_parse_expands_home() {
        let profiles = parse("[p]\nbin = \"~/bin\"\nkeep = \"/a~b\"\n").unwrap();
        assert_eq!(
            profiles.resolve("p").unwrap(),
            spec(json!({"bin": "/home/u/bin", "keep": "/a~b"}))
        );
    }

    #[test]
    fn test_parse_rejects_non_table_profile() {
        let err = parse("dev = \"/tmp\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn test_parse_rejects_non_string_leaf() {
        let err = parse("[dev]\ncount = 3").unwrap_err();
        assert!(err.to_string().contains("dev.count"));
    }

    #[test]
    fn test_parse_rejects_bad_syntax() {
        assert!(parse("[dev\nx = ").is_err());
    }

    #[test]
    fn test_missing_profile() {
        let profiles = Profiles::new();
        let err = profiles.resolve("nope").unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound { ref name } if name == "nope"));
    }

    #[test]
    fn test_inherit() {
        let profiles = parse(
            r#"
            [base]
            bin = { ls = "/bin/ls" }
            etc = "/etc"

            [dev]
            inherit = ["base"]
            bin = { cat = "/bin/cat" }
            etc = "/srv/etc"
            "#,
        )
        .unwrap();

        assert_eq!(
            profiles.resolve("dev").unwrap(),
            spec(json!({"bin": {"ls": "/bin/ls", "cat": "/bin/cat"}, "etc": "/srv/etc"}))
        );
    }

    #[test]
    fn test_inherit_cycle() {
        let profiles = parse("[a]\ninherit = [\"b\"]\n[b]\ninherit = [\"a\"]\n").unwrap();
        let err = profiles.resolve("a").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: profile inheritance cycle: a -> b -> a"
        );
    }

    #[test]
    fn test_inherit_unknown() {
        let profiles = parse("[a]\ninherit = [\"ghost\"]\n").unwrap();
        assert!(matches!(
            profiles.resolve("a").unwrap_err(),
            Error::ProfileNotFound { .. }
        ));
    }

    #[test]
    fn test_merge_from_user_wins() {
        let mut system = parse("[dev]\nbin = { ls = \"/bin/ls\" }\nlib = \"/lib\"\n").unwrap();
        let user = parse("[dev]\nbin = { cat = \"/bin/cat\" }\nlib = { c = \"/lib/c\" }\n[extra]\n").unwrap();

        system.merge_from(user);
        assert_eq!(system.len(), 2);
        assert_eq!(
            system.resolve("dev").unwrap(),
            spec(json!({"bin": {"ls": "/bin/ls", "cat": "/bin/cat"}, "lib": {"c": "/lib/c"}}))
        );
    }
}
