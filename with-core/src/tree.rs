//! Namespace trees: the mapping form consumed by the executor and the
//! ordered native form the executor reports back.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One value in a [`Specification`]: a source path or a nested sub-tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Source path mounted at this segment
    Leaf(String),
    /// Nested level of the namespace
    Tree(Specification),
}

impl Node {
    /// Create a leaf node
    #[must_use]
    pub fn leaf(source: impl Into<String>) -> Self {
        Self::Leaf(source.into())
    }

    /// Get the sub-tree, if this node is one
    #[must_use]
    pub const fn as_tree(&self) -> Option<&Specification> {
        match self {
            Self::Tree(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }

    /// Get the source path, if this node is a leaf
    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(source) => Some(source),
            Self::Tree(_) => None,
        }
    }
}

/// Resolved mapping from virtual path segment to source path or sub-tree
///
/// Keys are unique per level; inserting an existing key replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Specification(BTreeMap<String, Node>);

impl Specification {
    /// Create an empty specification
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a specification from a JSON value such as `{"bin": {"ls": "/bin/ls"}}`
    ///
    /// # Errors
    /// Returns error if the value is not a tree of objects and strings
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Insert a node, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        self.0.insert(key.into(), node)
    }

    /// Look up a segment
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Mutable lookup of a segment
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.0.get_mut(key)
    }

    /// Remove a segment
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.remove(key)
    }

    /// Check whether a segment is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Segments in key order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(segment, node)` pairs in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.0.iter()
    }

    /// Number of segments at this level
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this level is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as the executor's ordered native form (key order, no metadata)
    #[must_use]
    pub fn to_entries(&self) -> Vec<TreeEntry> {
        self.iter()
            .map(|(from, node)| match node {
                Node::Leaf(to) => TreeEntry::Leaf {
                    from: from.clone(),
                    to: to.clone(),
                },
                Node::Tree(tree) => TreeEntry::SubTree {
                    from: from.clone(),
                    children: tree.to_entries(),
                },
            })
            .collect()
    }
}

impl FromIterator<(String, Node)> for Specification {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Specification {
    type Item = (String, Node);
    type IntoIter = btree_map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Specification {
    type Item = (&'a String, &'a Node);
    type IntoIter = btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One ordered node of the executor's native namespace representation
///
/// Metadata markers are recognised once, when the native form is ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// `from` is mounted from the source path `to`
    Leaf {
        /// Virtual path segment
        from: String,
        /// Source path
        to: String,
    },

    /// `from` opens a nested level
    SubTree {
        /// Virtual path segment
        from: String,
        /// Ordered entries of the nested level
        children: Vec<TreeEntry>,
    },

    /// Executor annotation; not a path segment
    Metadata {
        /// Opaque tag
        tag: String,
    },
}

impl TreeEntry {
    /// Extract the metadata tag from a `from` value, if it is a marker
    ///
    /// A marker's `from` ends in `.` followed by one or more ASCII
    /// alphanumeric characters; those characters are the tag.
    #[must_use]
    pub fn metadata_tag(from: &str) -> Option<&str> {
        let (_, tag) = from.rsplit_once('.')?;
        (!tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric())).then_some(tag)
    }

    /// Parse the executor's JSON wire form (`[{"from": .., "to": ..}]`)
    ///
    /// # Errors
    /// Returns error if the JSON does not describe a tree
    pub fn parse_native(json: &str) -> Result<Vec<Self>> {
        let raw: Vec<RawEntry> = serde_json::from_str(json)?;
        Ok(raw.into_iter().map(Self::from).collect())
    }

    /// Check whether this entry is a metadata marker
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata { .. })
    }
}

/// Wire shape of one native entry
#[derive(Debug, Deserialize)]
struct RawEntry {
    from: String,
    to: RawTarget,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Path(String),
    Tree(Vec<RawEntry>),
}

impl From<RawEntry> for TreeEntry {
    fn from(raw: RawEntry) -> Self {
        if let Some(tag) = Self::metadata_tag(&raw.from) {
            return Self::Metadata {
                tag: tag.to_string(),
            };
        }

        match raw.to {
            RawTarget::Path(to) => Self::Leaf { from: raw.from, to },
            RawTarget::Tree(children) => Self::SubTree {
                from: raw.from,
                children: children.into_iter().map(Self::from).collect(),
            },
        }
    }
}
