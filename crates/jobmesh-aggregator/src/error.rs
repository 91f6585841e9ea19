//! Aggregation and search error types.

use jobmesh_db::DatabaseError;
use thiserror::Error;

/// Errors that reach the caller of an aggregation or search.
///
/// Adapter failures never appear here; they are logged and reported per
/// source in the summary.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The query was blank.
    #[error("query must not be empty")]
    EmptyQuery,

    /// The listing store could not be reached.
    #[error("listing store unavailable: {0}")]
    StoreUnavailable(#[source] DatabaseError),

    /// Any other store failure.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AggregateError {
    /// Classify a store error, promoting connection-level failures.
    #[must_use]
    pub fn from_store(error: DatabaseError) -> Self {
        if error.is_unavailable() {
            Self::StoreUnavailable(error)
        } else {
            Self::Database(error)
        }
    }
}

/// Result type alias for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregateError>;
