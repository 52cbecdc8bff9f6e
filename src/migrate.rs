//! Database schema migrations.
//!
//! Creates the tables the lookup service reads from. Every statement is
//! idempotent, so `oidx init` can be run repeatedly.
//!
//! # Schema
//!
//! ```text
//! oids             (id, oid UNIQUE, name, object_type, parent_id → oids.id)
//! mibs             (id, name UNIQUE)
//! oid_descriptions (id, oid_id → oids.id, mib_id → mibs.id, description)
//! ```

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Nodes, with a self-referential parent link
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS oids (
            id INTEGER PRIMARY KEY,
            oid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            object_type TEXT,
            parent_id INTEGER REFERENCES oids(id)
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create oids table")?;

    // Definition documents
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mibs (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create mibs table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS oid_descriptions (
            id INTEGER PRIMARY KEY,
            oid_id INTEGER NOT NULL REFERENCES oids(id),
            mib_id INTEGER NOT NULL REFERENCES mibs(id),
            description TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create oid_descriptions table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_oids_parent_id ON oids(parent_id)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_oid_descriptions_oid_id ON oid_descriptions(oid_id)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
