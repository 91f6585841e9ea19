//! Jobmesh Database Layer
//!
//! Provides `SQLite` persistence for aggregated listings.
//! Uses `SQLx` for pooled access and embedded migrations.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Connection Pooling**: up to 5 connections for files, one for `:memory:`
//! - **Listings** ([`listings`]): CRUD plus single-column search primitives
//! - **Store seam** ([`store`]): the `ListingStore` trait consumed by the pipeline
//!
//! # Example
//!
//! ```ignore
//! use jobmesh_db::Database;
//!
//! let db = Database::new("jobmesh.db").await?;
//! db.run_migrations().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod listings;
pub mod migrations;
pub mod store;

// Re-export commonly used types
pub use connection::ConnectionPool;
pub use error::{DatabaseError, Result};
pub use listings::{SearchField, StoredListing};
pub use store::ListingStore;

use std::path::Path;

/// High-level database interface.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open the database at `path` (or `:memory:`), creating it if missing.
    ///
    /// # Errors
    /// Returns `DatabaseError::Open` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = ConnectionPool::new(path).await?;
        Ok(Self { pool })
    }

    /// Create a database instance from an existing pool.
    #[must_use]
    pub fn from_pool(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Check that the database answers queries.
    ///
    /// # Errors
    /// Returns the connection error when the database is unreachable.
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Close the database connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_migrations() {
        let db = Database::new(":memory:").await.expect("create database");

        let version_before = db.get_schema_version().await.expect("get version");
        assert_eq!(version_before, 0);

        db.run_migrations().await.expect("run migrations");

        let version_after = db.get_schema_version().await.expect("get version");
        assert_eq!(version_after, 1);
    }

    #[tokio::test]
    async fn test_listings_schema() {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('listings') ORDER BY cid")
                .fetch_all(db.pool())
                .await
                .expect("query columns");

        assert!(columns.contains(&"source_key".to_string()));
        assert!(columns.contains(&"slug".to_string()));
        assert!(columns.contains(&"enrichment".to_string()));
        assert_eq!(columns.len(), 18);
    }

    #[tokio::test]
    async fn test_database_close() {
        let db = Database::new(":memory:").await.expect("create database");
        db.ping().await.expect("ping open database");

        db.close().await;
        assert!(db.ping().await.is_err());
    }
}
