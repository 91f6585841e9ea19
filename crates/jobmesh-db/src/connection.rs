//! Database connection management.
//!
//! Provides a `ConnectionPool` wrapper around the `SQLx` `SQLite` pool that
//! handles file creation and the in-memory special case.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Path that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// `SQLite` connection pool.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    pool: Pool<Sqlite>,
}

impl ConnectionPool {
    /// Open (creating if missing) the database at `path`.
    ///
    /// `:memory:` is served by a single long-lived connection so every query
    /// sees the same database.
    ///
    /// # Errors
    /// Returns `DatabaseError::Open` if the path is invalid or the file cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
        })?;
        let in_memory = path_str == MEMORY_PATH;

        let mut connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .foreign_keys(true)
            .create_if_missing(true);
        if !in_memory {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Database pool created at {}", path_str);

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Round-trip a trivial query.
    ///
    /// # Errors
    /// Returns the underlying error when the database cannot be reached.
    pub async fn ping(&self) -> Result<()> {
        if self.pool.is_closed() {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolClosed));
        }
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
