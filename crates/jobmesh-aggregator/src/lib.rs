//! Jobmesh Aggregator - Tiered aggregation and relevance search.
//!
//! This crate turns a free-text query into listings. The orchestrator asks
//! every relevant source for fresh postings, escalating from cheap REST APIs to
//! browser scrapes and finally to synthetic search links. The ranker answers
//! searches over what has already been stored.
//!
//! # Features
//!
//! - Concurrent adapters with a per-adapter time budget; one failure never cancels the rest
//! - Identity-key deduplication across sources
//! - Skip-if-exists persistence with saved/skipped/failed counts
//! - Multi-field weighted scoring with recency and a degrading location filter
//!
//! # Example
//!
//! ```rust,ignore
//! use jobmesh_aggregator::{AggregationOrchestrator, RelevanceRanker, SearchRequest};
//! use std::sync::Arc;
//!
//! let orchestrator = AggregationOrchestrator::new(
//!     adapters,
//!     FallbackLinks::from_registry(&registry),
//!     store.clone(),
//!     config.aggregation.clone(),
//! );
//! let summary = orchestrator.aggregate("Accountant", "Dhaka", true).await?;
//!
//! let ranker = RelevanceRanker::new(store, config.ranking.clone());
//! let page = ranker.search(&SearchRequest::new("accountant")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod orchestrator;
pub mod ranker;

pub use error::{AggregateError, Result};
pub use orchestrator::{AggregatedJobs, AggregationOrchestrator, AggregationSummary, SourceReport};
pub use ranker::{RelevanceRanker, SearchPage, SearchRequest};
