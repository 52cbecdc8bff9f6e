//! Single-node lookups and relation tree assembly.
//!
//! All functions operate through the [`OidStore`] trait and validate their
//! input before the store is contacted.
//!
//! # Relation Assembly
//!
//! [`resolve_relation`] builds the tree bottom-up:
//!
//! 1. Fetch the record of the queried node.
//! 2. Fetch its direct children and attach them as leaves.
//! 3. While the current record has a parent, wrap the accumulated tree as
//!    the sole child of the parent and fetch the parent's record.
//! 4. Return the root-most tree.
//!
//! The result is a single spine from the root down to the queried node,
//! fanning out only at the queried node's children. Store calls are
//! `2 + depth`.

use std::collections::HashSet;

use anyhow::anyhow;

use crate::error::LookupError;
use crate::models::{OidNode, OidRecord, Relation};
use crate::store::OidStore;

fn require_oid(oid: &str) -> Result<(), LookupError> {
    if oid.is_empty() {
        return Err(LookupError::invalid_input("oid must not be empty"));
    }
    Ok(())
}

fn non_empty(nodes: Vec<OidNode>) -> Result<Vec<OidNode>, LookupError> {
    if nodes.is_empty() {
        return Err(LookupError::not_found("no result"));
    }
    Ok(nodes)
}

/// Retrieves the full record of a node, including descriptions and the
/// parent reference.
pub async fn resolve_oid<S: OidStore + ?Sized>(
    store: &S,
    oid: &str,
) -> Result<OidRecord, LookupError> {
    require_oid(oid)?;
    store
        .fetch_by_path(oid)
        .await?
        .ok_or_else(|| LookupError::not_found(format!("oid not found: {}", oid)))
}

/// Retrieves the parent of a node. A root node yields
/// [`LookupError::NotFound`].
pub async fn resolve_parent<S: OidStore + ?Sized>(
    store: &S,
    oid: &str,
) -> Result<OidNode, LookupError> {
    require_oid(oid)?;
    store
        .fetch_parent(oid)
        .await?
        .ok_or_else(|| LookupError::not_found(format!("no parent for oid: {}", oid)))
}

/// Retrieves the other children of the node's parent. An empty set yields
/// [`LookupError::NotFound`].
pub async fn resolve_siblings<S: OidStore + ?Sized>(
    store: &S,
    oid: &str,
) -> Result<Vec<OidNode>, LookupError> {
    require_oid(oid)?;
    non_empty(store.fetch_siblings(oid).await?)
}

/// Retrieves the direct children of a node. An empty set yields
/// [`LookupError::NotFound`].
pub async fn resolve_children<S: OidStore + ?Sized>(
    store: &S,
    oid: &str,
) -> Result<Vec<OidNode>, LookupError> {
    require_oid(oid)?;
    non_empty(store.fetch_children(oid).await?)
}

/// Builds the relation tree for `oid`: its full ancestor chain up to the
/// root, plus its direct children.
///
/// Any store failure during the ascent aborts the build. A parent chain
/// that revisits a node is reported as a store error.
pub async fn resolve_relation<S: OidStore + ?Sized>(
    store: &S,
    oid: &str,
) -> Result<Relation, LookupError> {
    let mut current = resolve_oid(store, oid).await?;

    let children = store
        .fetch_children(oid)
        .await?
        .into_iter()
        .map(Relation::leaf)
        .collect();

    let mut relation = Relation {
        oid: current.node.clone(),
        children,
    };

    let mut visited = HashSet::from([current.node.oid.clone()]);

    while let Some(parent) = current.parent.take() {
        if !visited.insert(parent.oid.clone()) {
            return Err(anyhow!("cycle in parent chain at oid {}", parent.oid).into());
        }
        tracing::trace!(oid = %parent.oid, "ascending to parent");

        current = store.fetch_by_path(&parent.oid).await?.ok_or_else(|| {
            anyhow!(
                "parent {} of oid {} disappeared during lookup",
                parent.oid,
                relation.oid.oid
            )
        })?;

        relation = Relation {
            oid: parent,
            children: vec![relation],
        };
    }

    Ok(relation)
}
