//! Storage abstraction for OID Explorer.
//!
//! The [`OidStore`] trait defines the read-only primitives the relation
//! assembler and search need, enabling pluggable backends (SQLite,
//! in-memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{OidNode, OidRecord};
use crate::search::SearchQuery;

/// Abstract read-only storage backend.
///
/// A missing node is reported as `Ok(None)` or an empty `Vec`, never as an
/// error. Errors mean the backend could not answer.
///
/// Ordered results (`fetch_children`, `fetch_siblings`) are sorted by path
/// length ascending, then lexicographically, see
/// [`cmp_oid_paths`](crate::models::cmp_oid_paths).
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`fetch_by_path`](OidStore::fetch_by_path) | Full record incl. descriptions and parent reference |
/// | [`fetch_parent`](OidStore::fetch_parent) | Parent node (`None` for a root) |
/// | [`fetch_children`](OidStore::fetch_children) | Direct children |
/// | [`fetch_siblings`](OidStore::fetch_siblings) | Nodes sharing the same parent |
/// | [`search`](OidStore::search) | Substring search over names and paths |
#[async_trait]
pub trait OidStore: Send + Sync {
    /// Retrieve a node with its type, descriptions and parent reference.
    async fn fetch_by_path(&self, oid: &str) -> Result<Option<OidRecord>>;

    /// Retrieve the parent of a node. `None` if the node is a root or does
    /// not exist.
    async fn fetch_parent(&self, oid: &str) -> Result<Option<OidNode>>;

    /// Retrieve the direct children of a node.
    async fn fetch_children(&self, oid: &str) -> Result<Vec<OidNode>>;

    /// Retrieve all other nodes with the same parent.
    async fn fetch_siblings(&self, oid: &str) -> Result<Vec<OidNode>>;

    /// Run one of the search shapes described by [`SearchQuery`].
    async fn search(&self, query: &SearchQuery) -> Result<Vec<OidNode>>;
}
