//! Tree building: path strings and native executor trees to specifications

use tracing::trace;
use with_core::{Augmentation, Node, Specification, TreeEntry};

/// Build a single-branch specification from a `/`-separated virtual path
///
/// The innermost segment maps to `source_path`. Empty segments (from
/// leading, trailing or doubled slashes) are kept as literal keys.
#[must_use]
pub fn path_to_tree(virtual_path: &str, source_path: &str) -> Specification {
    let mut segments = virtual_path.rsplit('/');

    // rsplit always yields at least one segment
    let innermost = segments.next().unwrap_or_default();
    let mut tree = singleton(innermost, Node::leaf(source_path));

    for segment in segments {
        tree = singleton(segment, Node::Tree(tree));
    }

    tree
}

fn singleton(key: &str, node: Node) -> Specification {
    std::iter::once((key.to_string(), node)).collect()
}

/// Build the specification for one command-line augmentation
#[must_use]
pub fn augmentation_to_tree(augmentation: &Augmentation) -> Specification {
    path_to_tree(&augmentation.virtual_path, &augmentation.source_path)
}

/// Convert the executor's native tree into a specification
///
/// Metadata markers are dropped and a repeated `from` at one level keeps
/// only its last occurrence.
#[must_use]
pub fn native_to_spec(entries: &[TreeEntry]) -> Specification {
    let mut spec = Specification::new();

    for entry in entries {
        match entry {
            TreeEntry::Leaf { from, to } => {
                spec.insert(from.clone(), Node::leaf(to.clone()));
            }
            TreeEntry::SubTree { from, children } => {
                spec.insert(from.clone(), Node::Tree(native_to_spec(children)));
            }
            TreeEntry::Metadata { tag } => trace!(tag = %tag, "skipping metadata"),
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn spec(value: Value) -> Specification {
        Specification::from_json(value).unwrap()
    }

    fn leaf(from: &str, to: &str) -> TreeEntry {
        TreeEntry::Leaf {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_path_to_tree_nested() {
        assert_eq!(
            path_to_tree("a/b/c", "/src"),
            spec(json!({"a": {"b": {"c": "/src"}}}))
        );
    }

    #[test]
    fn test_path_to_tree_single_segment() {
        assert_eq!(path_to_tree("tmp", "/tmp"), spec(json!({"tmp": "/tmp"})));
    }

    #[test]
    fn test_path_to_tree_keeps_empty_segments() {
        assert_eq!(path_to_tree("/a", "/x"), spec(json!({"": {"a": "/x"}})));
        assert_eq!(path_to_tree("a/", "/x"), spec(json!({"a": {"": "/x"}})));
        assert_eq!(
            path_to_tree("a//b", "/x"),
            spec(json!({"a": {"": {"b": "/x"}}}))
        );
        assert_eq!(path_to_tree("", "/x"), spec(json!({"": "/x"})));
    }

    #[test]
    fn test_augmentation_to_tree_with_home() {
        let aug = Augmentation::parse("~/bin=/usr/bin", Some("/home/u")).unwrap();
        assert_eq!(aug.virtual_path, "/home/u/bin");
        assert_eq!(
            augmentation_to_tree(&aug),
            spec(json!({"": {"home": {"u": {"bin": "/usr/bin"}}}}))
        );
    }

    #[test]
    fn test_native_to_spec() {
        let entries = vec![
            TreeEntry::SubTree {
                from: "bin".to_string(),
                children: vec![leaf("ls", "/bin/ls"), TreeEntry::Metadata {
                    tag: "ro".to_string(),
                }],
            },
            leaf("tmp", "/tmp"),
        ];

        assert_eq!(
            native_to_spec(&entries),
            spec(json!({"bin": {"ls": "/bin/ls"}, "tmp": "/tmp"}))
        );
    }

    #[test]
    fn test_native_to_spec_last_occurrence_wins() {
        let entries = vec![
            leaf("bin", "/first"),
            TreeEntry::SubTree {
                from: "bin".to_string(),
                children: vec![leaf("ls", "/bin/ls")],
            },
            leaf("etc", "/etc"),
            leaf("etc", "/srv/etc"),
        ];

        assert_eq!(
            native_to_spec(&entries),
            spec(json!({"bin": {"ls": "/bin/ls"}, "etc": "/srv/etc"}))
        );
    }

    #[test]
    fn test_native_to_spec_drops_metadata() {
        let entries = TreeEntry::parse_native(r#"[{"from": "x.meta", "to": "/x"}]"#).unwrap();
        assert!(native_to_spec(&entries).is_empty());
    }
}
