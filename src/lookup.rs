//! CLI lookup commands.
//!
//! Each command opens the database read-only, delegates to the core lookup
//! functions, and prints either a human-readable listing or, with `--json`,
//! the same JSON the HTTP API returns.
//!
//! # Usage
//!
//! ```bash
//! oidx get 1.3.6.1.2.1
//! oidx relation 1.3.6.1.2.1 --json
//! oidx children 1.3.6.1
//! oidx search ifIndex --type name --limit 10
//! ```
//!
//! Lookup failures print `Error: <message>` to stderr and exit with
//! status 1.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

use oid_explorer_core::models::{OidNode, OidRecord, Relation};
use oid_explorer_core::relation;
use oid_explorer_core::search::{self, SearchCriteria, SearchField, SearchQuery};
use oid_explorer_core::LookupError;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

async fn open_store(config: &Config) -> Result<SqliteStore> {
    let pool = db::connect_read_only(config).await?;
    Ok(SqliteStore::new(pool))
}

/// Unwraps a lookup result or reports it the way the CLI reports errors.
fn or_exit<T>(result: Result<T, LookupError>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_nodes(nodes: &[OidNode]) {
    for node in nodes {
        println!("{}  {}", node.oid, node.name);
    }
}

/// Renders a relation tree, two spaces of indentation per level.
pub fn format_relation(relation: &Relation) -> String {
    let mut out = String::new();
    let mut stack = vec![(relation, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let _ = writeln!(
            out,
            "{}{} ({})",
            "  ".repeat(depth),
            node.oid.name,
            node.oid.oid
        );
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

fn print_record(record: &OidRecord) {
    println!("--- OID ---");
    println!("oid:         {}", record.node.oid);
    println!("name:        {}", record.node.name);
    println!(
        "object_type: {}",
        record.object_type.as_deref().unwrap_or("(none)")
    );
    match &record.parent {
        Some(p) => println!("parent:      {} ({})", p.name, p.oid),
        None => println!("parent:      (root)"),
    }
    println!();

    println!("--- Descriptions ({}) ---", record.descriptions.len());
    for d in &record.descriptions {
        println!("[{}]", d.mib);
        println!("{}", d.description);
        println!();
    }
}

/// CLI entry point for `oidx get <oid>`.
pub async fn run_get(config: &Config, oid: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let record = or_exit(relation::resolve_oid(&store, oid).await);
    store.pool().close().await;

    if json {
        return print_json(&record);
    }
    print_record(&record);
    Ok(())
}

/// CLI entry point for `oidx relation <oid>`.
pub async fn run_relation(config: &Config, oid: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let tree = or_exit(relation::resolve_relation(&store, oid).await);
    store.pool().close().await;

    if json {
        return print_json(&tree);
    }
    print!("{}", format_relation(&tree));
    Ok(())
}

/// CLI entry point for `oidx parent <oid>`.
pub async fn run_parent(config: &Config, oid: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let parent = or_exit(relation::resolve_parent(&store, oid).await);
    store.pool().close().await;

    if json {
        return print_json(&parent);
    }
    print_nodes(std::slice::from_ref(&parent));
    Ok(())
}

/// CLI entry point for `oidx siblings <oid>`.
pub async fn run_siblings(config: &Config, oid: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let nodes = or_exit(relation::resolve_siblings(&store, oid).await);
    store.pool().close().await;

    if json {
        return print_json(&nodes);
    }
    print_nodes(&nodes);
    Ok(())
}

/// CLI entry point for `oidx children <oid>`.
pub async fn run_children(config: &Config, oid: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let nodes = or_exit(relation::resolve_children(&store, oid).await);
    store.pool().close().await;

    if json {
        return print_json(&nodes);
    }
    print_nodes(&nodes);
    Ok(())
}

/// CLI entry point for `oidx search [keyword]`.
pub async fn run_search(
    config: &Config,
    keyword: Option<String>,
    kind: &str,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let keyword = keyword.filter(|k| !k.is_empty());
    let field = match keyword {
        Some(_) => or_exit(kind.parse::<SearchField>()),
        None => SearchField::Any,
    };
    let criteria = SearchCriteria {
        keyword,
        field,
        limit,
    };

    let max_limit = Some(config.search.max_limit);
    or_exit(SearchQuery::from_criteria(&criteria, max_limit));

    let store = open_store(config).await?;
    let nodes = or_exit(search::search(&store, &criteria, max_limit).await);
    store.pool().close().await;

    if json {
        return print_json(&nodes);
    }
    print_nodes(&nodes);
    Ok(())
}
