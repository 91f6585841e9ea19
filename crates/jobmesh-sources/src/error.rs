//! Error types for the sources subsystem.
//!
//! [`SourceError`] covers definition loading and registry lookups.
//! [`AdapterError`] is what a single adapter call can fail with; the
//! orchestrator logs it and treats the adapter as having returned nothing.

use jobmesh_browser::BrowserError;
use thiserror::Error;

/// Errors that can occur while loading or querying source definitions.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Source definition not found
    #[error("source definition not found: {source_id}")]
    NotFound {
        /// The source ID that was not found
        source_id: String,
    },

    /// Failed to load source definition from file
    #[error("failed to load source definition from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse source definition TOML
    #[error("failed to parse source definition TOML in {path}: {source}")]
    ParseError {
        /// Path to the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid source definition (validation failed)
    #[error("invalid source definition for {source_id}: {reason}")]
    ValidationError {
        /// Source ID being validated
        source_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Source definition directory not found
    #[error("source definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// A search or fallback URL could not be built
    #[error("invalid URL for {source_id}: {reason}")]
    InvalidUrl {
        /// Source the URL belongs to
        source_id: String,
        /// What went wrong
        reason: String,
    },

    /// Failed to construct the shared HTTP client
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// I/O error while accessing source definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid source ID format
    #[error("invalid source ID: {0}")]
    InvalidId(#[from] jobmesh_core::JobmeshError),
}

/// Failure of a single adapter call.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset, client timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the JSON shape we expected
    #[error("malformed response: {0}")]
    Decode(String),

    /// Browser automation failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Extraction selectors no longer match the page markup
    #[error("selectors outdated: {0}")]
    SelectorsOutdated(String),

    /// A bounded wait expired
    #[error("timed out: {0}")]
    Timeout(String),

    /// The board served a CAPTCHA or access-denied page
    #[error("blocked by {0}")]
    Blocked(String),

    /// The search URL could not be built
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result type for source definition operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Result type for adapter calls.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdapterError::Http {
            status: 503,
            url: "https://remotive.com/api/remote-jobs".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 503 from https://remotive.com/api/remote-jobs"
        );

        let err = SourceError::ValidationError {
            source_id: "bdjobs".to_string(),
            reason: "search.template cannot be empty".to_string(),
        };
        assert!(err.to_string().contains("bdjobs"));
    }

    #[test]
    fn test_browser_error_converts() {
        let err: AdapterError = BrowserError::SessionClosed.into();
        assert!(matches!(err, AdapterError::Browser(_)));
    }
}
