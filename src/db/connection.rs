//! Session store connection management
//!
//! The store is a private in-memory SQLite database. It lives exactly as long
//! as the one pooled connection that holds it, so the pool never recycles it.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A second connection would open a second, empty in-memory database.
const MAX_CONNECTIONS: u32 = 1;

/// Session store handle
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    /// Create a fresh, empty session store
    ///
    /// # Returns
    /// * `Ok(Database)` - Store ready for use, holding no projects
    /// * `Err(DeskError)` - If SQLite could not be opened
    ///
    /// # Examples
    /// ```no_run
    /// use bid_desk_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::in_memory().await?;
    /// assert_eq!(db.project_count().await?, 0);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .min_connections(MAX_CONNECTIONS)
            .max_connections(MAX_CONNECTIONS)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
        };

        db.initialize_schema().await?;
        debug!("session store initialized");

        Ok(db)
    }

    /// Create all tables
    async fn initialize_schema(&self) -> Result<()> {
        let schema = include_str!("../../database/schema.sql");

        // sqlx runs one statement per query against SQLite
        for statement in schema.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(self.pool.as_ref()).await?;
            }
        }

        Ok(())
    }

    /// Get reference to the connection pool
    ///
    /// Used internally by query modules.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the store. Everything in it is gone afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Totals across the whole store
    pub async fn stats(&self) -> Result<StoreStats> {
        let project_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(self.pool.as_ref())
            .await?;

        let bid_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bids")
            .fetch_one(self.pool.as_ref())
            .await?;

        let item_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM procurement_items")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(StoreStats {
            total_projects: project_count.0,
            total_bids: bid_count.0,
            total_procurement_items: item_count.0,
        })
    }
}

/// Store statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub total_projects: i64,
    pub total_bids: i64,
    pub total_procurement_items: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = Database::in_memory().await;
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn test_database_stats() {
        let db = Database::in_memory().await.unwrap();
        let stats = db.stats().await.unwrap();

        assert_eq!(stats.total_projects, 0);
        assert_eq!(stats.total_bids, 0);
        assert_eq!(stats.total_procurement_items, 0);
    }

    #[tokio::test]
    async fn test_schema_initialization() {
        let db = Database::in_memory().await.unwrap();

        for table in ["projects", "bids", "procurement_items"] {
            let result: std::result::Result<(i64,), sqlx::Error> =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                    .fetch_one(db.pool())
                    .await;
            assert!(result.is_ok(), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_separate_stores_do_not_share_state() {
        let first = Database::in_memory().await.unwrap();
        let second = Database::in_memory().await.unwrap();

        sqlx::query(
            "INSERT INTO projects (name, description, start_date, end_date) VALUES ('a', '', '2024-01-01', '2024-01-02')",
        )
        .execute(first.pool())
        .await
        .unwrap();

        assert_eq!(first.stats().await.unwrap().total_projects, 1);
        assert_eq!(second.stats().await.unwrap().total_projects, 0);
    }
}
