//! # OID Explorer Core
//!
//! Storage-agnostic logic for OID Explorer: data models, the [`store::OidStore`]
//! abstraction, the relation assembler, and search criteria handling.
//!
//! This crate contains no tokio runtime, sqlx, or filesystem I/O. Frontends
//! (CLI, HTTP) pick a store implementation and call the functions in
//! [`relation`] and [`search`].

pub mod error;
pub mod models;
pub mod relation;
pub mod search;
pub mod store;

pub use error::LookupError;
pub use models::{Description, OidNode, OidRecord, Relation};
