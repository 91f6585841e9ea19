//! Jobmesh Core - Foundation crate for the jobmesh aggregation pipeline.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the pure text helpers that every other jobmesh crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and records (`SourceId`, `ListingDraft`)
//! - [`text`] - Normalization, tokenization and word-boundary truncation
//! - [`dedup`] - Stable identity keys for listings
//!
//! # Example
//!
//! ```rust
//! use jobmesh_core::{build_key, truncate_at_word, AppConfig};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.aggregation.result_cap, 30);
//!
//! let key = build_key("Rust Engineer", "Acme", "remotive");
//! assert_eq!(key.len(), 16);
//!
//! assert_eq!(truncate_at_word("short", 10), "short");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod dedup;
pub mod error;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use config::{
    AggregationConfig, AppConfig, BrowserConfig, EnrichmentConfig, GeneralConfig, RankingConfig,
    RankingWeights, SourcesConfig,
};
pub use dedup::build_key;
pub use error::{ConfigError, ConfigResult, JobmeshError, Result};
pub use text::{contains_phrase, normalize, slugify, tokenize, truncate_at_word};
pub use types::{ListingDraft, SourceId, SourceTier, FALLBACK_SOURCE};
