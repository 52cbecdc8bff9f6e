//! # OID Explorer
//!
//! A read-only lookup service over the hierarchical OID namespace.
//!
//! Every node is a dotted numeric path (`1.3.6.1.2.1`) with a name, an
//! optional type tag, and descriptions collected from MIB modules. Clients
//! look nodes up by exact oid, by keyword, or by structural relation:
//! parent, siblings, children, and the full tree from the root down to a
//! node's children.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │   CLI    │   │   HTTP   │
//! │  (oidx)  │   │  (axum)  │
//! └────┬─────┘   └────┬─────┘
//!      └──────┬───────┘
//!             ▼
//!   ┌───────────────────┐     ┌──────────┐
//!   │ oid-explorer-core │────▶│  SQLite  │
//!   │ relation / search │     │  store   │
//!   └───────────────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! oidx init                         # create database schema
//! oidx get 1.3.6.1.2.1              # full record
//! oidx relation 1.3.6.1.2.1         # tree from the root
//! oidx search ifIndex --type name
//! oidx serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite pools and the lazily-initialized shared store |
//! | [`migrate`] | Database schema (idempotent) |
//! | [`sqlite_store`] | [`OidStore`](oid_explorer_core::store::OidStore) over SQLite |
//! | [`lookup`] | CLI lookup commands |
//! | [`server`] | HTTP API (Axum) with CORS |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod db;
pub mod logging;
pub mod lookup;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

pub use oid_explorer_core::{models, relation, search, store, LookupError};
