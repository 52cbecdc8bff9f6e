//! SQLite database connection management.
//!
//! Two kinds of pools are handed out:
//!
//! - [`connect`] opens the database read-write, creating the file and its
//!   parent directories if needed. Used by `oidx init`.
//! - [`connect_read_only`] opens an existing database read-only. Used by the
//!   lookup commands and the HTTP server.
//!
//! # Shared Store
//!
//! The server keeps one [`SharedStore`] for the process lifetime. The pool
//! is created on first use; if that fails, the next caller tries again.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Create a read-write connection pool, creating the database if missing.
///
/// Enables WAL journal mode and allows up to 5 connections.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a read-only connection pool to an existing database.
///
/// Fails if the database file does not exist.
pub async fn connect_read_only(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database at {}", db_path.display()))
}

/// Lazily-initialized, process-wide store handle.
///
/// Backed by [`OnceCell::get_or_try_init`]: concurrent first callers wait
/// for a single initialization, the first success is kept, and a failure
/// leaves the cell empty.
pub struct SharedStore {
    config: Config,
    cell: OnceCell<SqliteStore>,
}

impl SharedStore {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            cell: OnceCell::new(),
        }
    }

    /// Path of the database this handle connects to.
    pub fn path(&self) -> &PathBuf {
        &self.config.db.path
    }

    /// Returns the store, connecting on first use.
    pub async fn get(&self) -> Result<&SqliteStore> {
        self.cell
            .get_or_try_init(|| async {
                tracing::debug!(path = %self.config.db.path.display(), "connecting to database");
                let pool = connect_read_only(&self.config).await?;
                Ok::<_, anyhow::Error>(SqliteStore::new(pool))
            })
            .await
            .context("failed to get db")
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Closes the pool if it was ever opened.
    pub async fn close(&self) {
        if let Some(store) = self.cell.get() {
            store.pool().close().await;
        }
    }
}
