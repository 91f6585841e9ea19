//! Database error types.
//!
//! Provides error handling for database operations using `thiserror`.

use thiserror::Error;

/// Database-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create database connection.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Database record with provided identifier not found.
    #[error("{0}")]
    NotFoundWithMessage(String),

    /// Record rejected before reaching the table.
    #[error("invalid record: {0}")]
    Validation(String),

    /// A listing with the same identity key is already stored.
    #[error("duplicate listing: {0}")]
    Duplicate(String),

    /// Failed to decode database value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Whether the store itself is unreachable, as opposed to one record failing.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Open(_) => true,
            Self::Sqlx(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(DatabaseError::Sqlx(sqlx::Error::PoolClosed).is_unavailable());
        assert!(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(DatabaseError::Open("locked".to_string()).is_unavailable());

        assert!(!DatabaseError::Validation("blank apply_url".to_string()).is_unavailable());
        assert!(!DatabaseError::Duplicate("abc".to_string()).is_unavailable());
        assert!(!DatabaseError::Sqlx(sqlx::Error::RowNotFound).is_unavailable());
    }
}
