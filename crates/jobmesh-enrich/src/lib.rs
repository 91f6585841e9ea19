//! Jobmesh Enrich - AI enrichment content for stored listings.
//!
//! Generated content enters through [`parse_enhanced`], which turns loosely
//! shaped JSON into the typed [`EnhancedContent`] schema. Before storage the
//! payload is serialized under a hard byte budget by
//! [`stringify_for_storage`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod payload;
pub mod storage;
pub mod validate;
pub mod writer;

pub use error::{EnrichError, Result};
pub use payload::{
    ApplyInfo, EnhancedContent, Header, LabeledValue, ListGroup, Section, SectionBody, SeoMeta,
};
pub use storage::{stringify_for_storage, stringify_value_for_storage};
pub use validate::parse_enhanced;
pub use writer::{listing_slug, EnrichmentOutcome, EnrichmentWriter};
