//! SQLite-backed [`OidStore`] implementation.
//!
//! Translates every store primitive into SQL against the schema created by
//! [`migrate`](crate::migrate). Ordering and matching mirror
//! [`InMemoryStore`](oid_explorer_core::store::memory::InMemoryStore):
//! children and siblings by `LENGTH(oid), oid`, search hits by the `INSTR`
//! position of the keyword.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use oid_explorer_core::models::{Description, OidNode, OidRecord};
use oid_explorer_core::search::{SearchFilter, SearchQuery};
use oid_explorer_core::store::OidStore;

/// SQLite implementation of the [`OidStore`] trait.
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn node_from_row(row: &SqliteRow) -> OidNode {
    OidNode {
        name: row.get("name"),
        oid: row.get("oid"),
    }
}

/// `LIMIT -1` means no limit in SQLite.
fn sql_limit(limit: Option<usize>) -> i64 {
    limit
        .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
        .unwrap_or(-1)
}

#[async_trait]
impl OidStore for SqliteStore {
    async fn fetch_by_path(&self, oid: &str) -> Result<Option<OidRecord>> {
        let row = sqlx::query(
            r#"
            SELECT o.id, o.name, o.oid, o.object_type,
                   p.name AS parent_name, p.oid AS parent_oid
            FROM oids o
            LEFT JOIN oids p ON o.parent_id = p.id
            WHERE o.oid = ?
            "#,
        )
        .bind(oid)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query database for oid")?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let id: i64 = row.get("id");
        let description_rows = sqlx::query(
            r#"
            SELECT m.name AS mib, d.description
            FROM oid_descriptions d
            JOIN mibs m ON d.mib_id = m.id
            WHERE d.oid_id = ?
            ORDER BY m.name, d.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("failed to query database for descriptions")?;

        let descriptions = description_rows
            .iter()
            .map(|r| Description {
                mib: r.get("mib"),
                description: r.get("description"),
            })
            .collect();

        let parent_name: Option<String> = row.get("parent_name");
        let parent_oid: Option<String> = row.get("parent_oid");
        let parent = match (parent_name, parent_oid) {
            (Some(name), Some(oid)) => Some(OidNode { name, oid }),
            _ => None,
        };

        Ok(Some(OidRecord {
            node: node_from_row(&row),
            object_type: row.get("object_type"),
            descriptions,
            parent,
        }))
    }

    async fn fetch_parent(&self, oid: &str) -> Result<Option<OidNode>> {
        let row = sqlx::query(
            r#"
            SELECT p.name, p.oid
            FROM oids o
            JOIN oids p ON o.parent_id = p.id
            WHERE o.oid = ?
            "#,
        )
        .bind(oid)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query database for parent")?;

        Ok(row.as_ref().map(node_from_row))
    }

    async fn fetch_children(&self, oid: &str) -> Result<Vec<OidNode>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name, c.oid
            FROM oids c
            JOIN oids p ON c.parent_id = p.id
            WHERE p.oid = ?
            ORDER BY LENGTH(c.oid), c.oid
            "#,
        )
        .bind(oid)
        .fetch_all(&self.pool)
        .await
        .context("failed to query database for children")?;

        Ok(rows.iter().map(node_from_row).collect())
    }

    async fn fetch_siblings(&self, oid: &str) -> Result<Vec<OidNode>> {
        // A NULL parent_id never compares equal, so roots have no siblings.
        let rows = sqlx::query(
            r#"
            SELECT name, oid
            FROM oids
            WHERE parent_id = (SELECT parent_id FROM oids WHERE oid = ?)
              AND oid != ?
            ORDER BY LENGTH(oid), oid
            "#,
        )
        .bind(oid)
        .bind(oid)
        .fetch_all(&self.pool)
        .await
        .context("failed to query database for siblings")?;

        Ok(rows.iter().map(node_from_row).collect())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<OidNode>> {
        let limit = sql_limit(query.limit);

        let rows = match &query.filter {
            SearchFilter::All => {
                sqlx::query("SELECT name, oid FROM oids ORDER BY oid LIMIT ?")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            SearchFilter::Any(keyword) => {
                sqlx::query(
                    r#"
                    SELECT name, oid FROM (
                        SELECT name, oid,
                               INSTR(LOWER(name), LOWER(?)) AS name_pos,
                               INSTR(LOWER(oid), LOWER(?)) AS oid_pos
                        FROM oids
                    )
                    WHERE name_pos > 0 OR oid_pos > 0
                    ORDER BY CASE
                                 WHEN name_pos = 0 THEN oid_pos
                                 WHEN oid_pos = 0 THEN name_pos
                                 ELSE MIN(name_pos, oid_pos)
                             END,
                             name, oid
                    LIMIT ?
                    "#,
                )
                .bind(keyword)
                .bind(keyword)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            SearchFilter::Name(keyword) => {
                sqlx::query(
                    r#"
                    SELECT name, oid FROM (
                        SELECT name, oid, INSTR(LOWER(name), LOWER(?)) AS pos FROM oids
                    )
                    WHERE pos > 0
                    ORDER BY pos, name, oid
                    LIMIT ?
                    "#,
                )
                .bind(keyword)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            SearchFilter::Oid(keyword) => {
                sqlx::query(
                    r#"
                    SELECT name, oid FROM (
                        SELECT name, oid, INSTR(LOWER(oid), LOWER(?)) AS pos FROM oids
                    )
                    WHERE pos > 0
                    ORDER BY pos, name, oid
                    LIMIT ?
                    "#,
                )
                .bind(keyword)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("failed to query database")?;

        Ok(rows.iter().map(node_from_row).collect())
    }
}
