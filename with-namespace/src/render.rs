//! Tree rendering
//!
//! Both output forms share one traversal driven by a [`Style`]:
//! - Show - one `from -> to` line per leaf, indented sub-trees and a
//!   trailing `meta:` line per level
//! - Clone - a single line of `-a virtual=source` flags that re-creates the
//!   tree when passed back on the command line, followed by every metadata
//!   tag as bare words

use with_core::{Augmentation, Error, Result, TreeEntry};

/// Output form of [`render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Human-readable indented listing
    Show,
    /// Command-line flags reconstructing the tree
    Clone,
}

/// Formatting record for one output form
struct Style {
    leaf: fn(&str, &str, &str) -> String,
    open: fn(&str, &str) -> Option<String>,
    meta: fn(&str, &[&str]) -> String,
    descend: fn(&str, &str) -> String,
    separator: &'static str,
    trailing_newline: bool,
    /// Emit all tags once after the last entry instead of per level
    defer_meta: bool,
}

const SHOW_INDENT: &str = "    ";

static SHOW: Style = Style {
    leaf: |indent, from, to| format!("{indent}{from} -> {to}"),
    open: |indent, from| Some(format!("{indent}{from}:")),
    meta: |indent, tags| format!("{indent}meta: {}", tags.join(" ")),
    descend: |indent, _| format!("{indent}{SHOW_INDENT}"),
    separator: "\n",
    trailing_newline: true,
    defer_meta: false,
};

// Tags come last: the first bare word on a command line starts the command,
// so no `-a` may follow one.
static CLONE: Style = Style {
    leaf: |prefix, from, to| format!("-a {}", shell_words::quote(&format!("{prefix}{from}={to}"))),
    open: |_, _| None,
    meta: |_, tags| shell_words::join(tags),
    descend: |prefix, from| format!("{prefix}{from}/"),
    separator: " ",
    trailing_newline: false,
    defer_meta: true,
};

impl RenderMode {
    fn style(self) -> &'static Style {
        match self {
            Self::Show => &SHOW,
            Self::Clone => &CLONE,
        }
    }
}

/// Render a native tree in the requested form
///
/// Entries are emitted in their given order.
#[must_use]
pub fn render(tree: &[TreeEntry], mode: RenderMode) -> String {
    let style = mode.style();
    let mut parts = Vec::new();
    let mut deferred = Vec::new();
    walk(tree, style, "", &mut parts, &mut deferred);

    if !deferred.is_empty() {
        parts.push((style.meta)("", &deferred));
    }

    let mut out = parts.join(style.separator);
    if style.trailing_newline && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn walk<'a>(
    entries: &'a [TreeEntry],
    style: &Style,
    context: &str,
    parts: &mut Vec<String>,
    deferred: &mut Vec<&'a str>,
) {
    let mut tags = Vec::new();

    for entry in entries {
        match entry {
            TreeEntry::Leaf { from, to } => parts.push((style.leaf)(context, from, to)),
            TreeEntry::SubTree { from, children } => {
                if let Some(line) = (style.open)(context, from) {
                    parts.push(line);
                }
                walk(children, style, &(style.descend)(context, from), parts, deferred);
            }
            TreeEntry::Metadata { tag } => tags.push(tag.as_str()),
        }
    }

    if style.defer_meta {
        deferred.extend(tags);
    } else if !tags.is_empty() {
        parts.push((style.meta)(context, &tags));
    }
}

/// Recover the augmentations from a clone-mode line
///
/// Only `-a` pairs are read back; metadata words carry no data and are
/// skipped.
pub fn parse_clone(line: &str) -> Result<Vec<Augmentation>> {
    let words = shell_words::split(line).map_err(|e| Error::InvalidInput {
        message: format!("cannot split clone line: {e}"),
    })?;
    let mut words = words.iter();
    let mut augmentations = Vec::new();

    while let Some(word) = words.next() {
        if word == "-a"
            && let Some(value) = words.next()
        {
            augmentations.push(Augmentation::parse(value, None)?);
        }
    }

    Ok(augmentations)
}
