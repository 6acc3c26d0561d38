//! # arbor-db
//!
//! libSQL persistence for Arbor: the flow store (nodes grouped by topic) and
//! the append-only usage log.
//!
//! Uses the `libsql` crate (C `SQLite` fork). Every read hits the database;
//! nothing is cached between calls.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all Arbor state operations.
pub struct ArborDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ArborDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let arbor_db = Self { db, conn };
        arbor_db.run_migrations().await?;
        tracing::debug!(path, "opened flow store");
        Ok(arbor_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"use-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    async fn test_db() -> ArborDb {
        ArborDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        for table in ["flow_nodes", "usage_log"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("use").await.unwrap();
        assert!(id.starts_with("use-"), "ID should start with 'use-': {id}");
        assert_eq!(id.len(), 12, "ID should be 12 chars: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn flow_node_primary_key_is_topic_and_id() {
        let db = test_db().await;
        let insert = "INSERT INTO flow_nodes (topic, id, position, question) VALUES (?1, ?2, ?3, ?4)";
        db.conn()
            .execute(insert, libsql::params!["Engine", "1", 0, "q"])
            .await
            .unwrap();
        db.conn()
            .execute(insert, libsql::params!["Brakes", "1", 0, "q"])
            .await
            .unwrap();
        let duplicate = db
            .conn()
            .execute(insert, libsql::params!["Engine", "1", 1, "q"])
            .await;
        assert!(duplicate.is_err(), "same (topic, id) should be rejected");
    }
}
