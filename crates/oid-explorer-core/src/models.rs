//! Data types returned by the lookup operations.
//!
//! Two record shapes exist on purpose: [`OidNode`] is the bare `{name, oid}`
//! pair used for parents, children, siblings, search hits and relation
//! trees, while [`OidRecord`] carries the full metadata of a single node.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A node of the namespace, identified by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OidNode {
    /// Human-readable label, e.g. `"mib-2"`.
    pub name: String,
    /// Dotted numeric path, e.g. `"1.3.6.1.2.1"`. Globally unique.
    pub oid: String,
}

impl OidNode {
    pub fn new(name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oid: oid.into(),
        }
    }
}

/// A textual description of a node taken from one MIB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Name of the MIB module the description comes from.
    pub mib: String,
    pub description: String,
}

/// Full record for a single node.
///
/// `parent` is `None` for the root of a branch. It is a reference by path
/// only; the parent's own metadata is never embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidRecord {
    #[serde(flatten)]
    pub node: OidNode,
    pub object_type: Option<String>,
    pub descriptions: Vec<Description>,
    pub parent: Option<OidNode>,
}

/// A tree view of the namespace anchored at a queried node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub oid: OidNode,
    pub children: Vec<Relation>,
}

impl Relation {
    /// A relation without children.
    pub fn leaf(node: OidNode) -> Self {
        Self {
            oid: node,
            children: Vec::new(),
        }
    }

    /// Follows the unique child at each level, starting at `self`, and
    /// returns the visited nodes root first.
    ///
    /// The walk stops at the first level with zero or several children, so
    /// for a tree built by [`resolve_relation`](crate::relation::resolve_relation)
    /// the last element is the queried node (unless it has exactly one child,
    /// in which case that child is included as well).
    pub fn spine(&self) -> Vec<&OidNode> {
        let mut out = vec![&self.oid];
        let mut current = self;
        while let [only] = current.children.as_slice() {
            out.push(&only.oid);
            current = only;
        }
        out
    }
}

/// Orders dotted paths the way the store sorts them: shorter paths first,
/// then lexicographically.
///
/// `"1.2" < "1.3" < "1.10"`.
pub fn cmp_oid_paths(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
