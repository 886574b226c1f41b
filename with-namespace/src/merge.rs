//! Precedence-aware recursive merge
//!
//! For every key of the source: a leaf replaces whatever the target held;
//! a sub-tree merges recursively into a target sub-tree and otherwise
//! replaces the target value wholesale. The operation is neither
//! commutative nor associative, so callers must apply specifications from
//! lowest to highest precedence.

use tracing::trace;
use with_core::{Node, Specification};

/// Merge `source` over `target`, returning the result
#[must_use]
pub fn merge(mut target: Specification, source: &Specification) -> Specification {
    merge_into(&mut target, source);
    target
}

/// Merge `source` over `target` in place
pub fn merge_into(target: &mut Specification, source: &Specification) {
    for (key, incoming) in source {
        if let (Some(Node::Tree(existing)), Node::Tree(subtree)) = (target.get_mut(key), incoming) {
            trace!(key = %key, "merging sub-tree");
            merge_into(existing, subtree);
            continue;
        }

        trace!(key = %key, "replacing entry");
        target.insert(key.clone(), incoming.clone());
    }
}
