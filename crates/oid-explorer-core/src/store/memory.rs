//! In-memory [`OidStore`] implementation for tests and fixtures.
//!
//! Nodes live in a `HashMap` behind `std::sync::RwLock`. Ordering and
//! matching follow the same rules as the SQLite store.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{cmp_oid_paths, Description, OidNode, OidRecord};
use crate::search::SearchQuery;

use super::OidStore;

struct StoredNode {
    name: String,
    object_type: Option<String>,
    parent: Option<String>,
    descriptions: Vec<Description>,
}

/// In-memory store keyed by oid.
pub struct InMemoryStore {
    nodes: RwLock<HashMap<String, StoredNode>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a node. `parent` is the parent's oid.
    pub fn insert(&self, name: &str, oid: &str, parent: Option<&str>) {
        let mut nodes = self.nodes.write().unwrap();
        nodes.insert(
            oid.to_string(),
            StoredNode {
                name: name.to_string(),
                object_type: None,
                parent: parent.map(str::to_string),
                descriptions: Vec::new(),
            },
        );
    }

    /// Set the type tag of an existing node. Unknown oids are ignored.
    pub fn set_object_type(&self, oid: &str, object_type: &str) {
        if let Some(node) = self.nodes.write().unwrap().get_mut(oid) {
            node.object_type = Some(object_type.to_string());
        }
    }

    /// Append a description to an existing node. Unknown oids are ignored.
    pub fn add_description(&self, oid: &str, mib: &str, description: &str) {
        if let Some(node) = self.nodes.write().unwrap().get_mut(oid) {
            node.descriptions.push(Description {
                mib: mib.to_string(),
                description: description.to_string(),
            });
            node.descriptions.sort_by(|a, b| a.mib.cmp(&b.mib));
        }
    }

    fn node_ref(nodes: &HashMap<String, StoredNode>, oid: &str) -> Option<OidNode> {
        nodes.get(oid).map(|n| OidNode::new(&n.name, oid))
    }

    fn sorted(mut out: Vec<OidNode>) -> Vec<OidNode> {
        out.sort_by(|a, b| cmp_oid_paths(&a.oid, &b.oid));
        out
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OidStore for InMemoryStore {
    async fn fetch_by_path(&self, oid: &str) -> Result<Option<OidRecord>> {
        let nodes = self.nodes.read().unwrap();
        let stored = match nodes.get(oid) {
            Some(s) => s,
            None => return Ok(None),
        };
        let parent = stored
            .parent
            .as_deref()
            .and_then(|p| Self::node_ref(&nodes, p));

        Ok(Some(OidRecord {
            node: OidNode::new(&stored.name, oid),
            object_type: stored.object_type.clone(),
            descriptions: stored.descriptions.clone(),
            parent,
        }))
    }

    async fn fetch_parent(&self, oid: &str) -> Result<Option<OidNode>> {
        let nodes = self.nodes.read().unwrap();
        Ok(nodes
            .get(oid)
            .and_then(|n| n.parent.as_deref())
            .and_then(|p| Self::node_ref(&nodes, p)))
    }

    async fn fetch_children(&self, oid: &str) -> Result<Vec<OidNode>> {
        let nodes = self.nodes.read().unwrap();
        let children = nodes
            .iter()
            .filter(|(_, n)| n.parent.as_deref() == Some(oid))
            .map(|(k, n)| OidNode::new(&n.name, k))
            .collect();
        Ok(Self::sorted(children))
    }

    async fn fetch_siblings(&self, oid: &str) -> Result<Vec<OidNode>> {
        let nodes = self.nodes.read().unwrap();
        let parent = match nodes.get(oid).and_then(|n| n.parent.clone()) {
            Some(p) => p,
            None => return Ok(Vec::new()),
        };
        let siblings = nodes
            .iter()
            .filter(|(k, n)| k.as_str() != oid && n.parent.as_deref() == Some(parent.as_str()))
            .map(|(k, n)| OidNode::new(&n.name, k))
            .collect();
        Ok(Self::sorted(siblings))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<OidNode>> {
        let nodes = self.nodes.read().unwrap();
        let mut results: Vec<OidNode> = nodes
            .iter()
            .map(|(k, n)| OidNode::new(&n.name, k))
            .filter(|node| query.match_position(node).is_some())
            .collect();
        results.sort_by(|a, b| query.cmp_results(a, b));
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }
}
