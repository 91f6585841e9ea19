//! Enrichment error types.

use jobmesh_db::DatabaseError;
use thiserror::Error;

/// Errors raised while validating or storing enrichment content.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The generated payload was not a JSON object.
    #[error("enrichment payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Storing the payload failed.
    #[error("failed to store enrichment: {0}")]
    Store(#[from] DatabaseError),
}

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;
