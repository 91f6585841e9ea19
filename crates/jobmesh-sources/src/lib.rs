//! Jobmesh Sources - Job source definitions and adapters.
//!
//! This crate knows every board jobmesh can query. Boards are described in
//! TOML files; adapters are built from those definitions, so adding a board
//! is a data change rather than new scraping code.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Source metadata, search method and
//!   fallback link
//! - **Loader** ([`loader`]): TOML file loading from `source-definitions/`
//! - **Registry** ([`registry`]): In-memory cache of loaded definitions
//! - **Locale** ([`locale`]): Location hint classification used for routing
//! - **Adapters** ([`adapter`], [`rest`], [`browser`]): The `SourceAdapter`
//!   contract and its two tiers
//! - **Fallback** ([`fallback`]): Synthetic search links when everything else is empty
//!
//! # Example
//!
//! ```rust
//! use jobmesh_sources::{LocaleSignal, SourceRegistry, FallbackLinks};
//!
//! let registry = SourceRegistry::new();
//! let links = FallbackLinks::from_registry(&registry);
//! assert!(links.generate("Accountant", "Bangladesh").is_empty());
//!
//! assert_eq!(LocaleSignal::detect("Dhaka").region_code(), Some("bd"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod adapter;
pub mod browser;
pub mod definition;
pub mod error;
pub mod fallback;
pub mod loader;
pub mod locale;
pub mod parser;
pub mod registry;
pub mod rest;
pub mod url_builder;

// Re-export commonly used types
pub use adapter::{build_adapters, SourceAdapter};
pub use browser::{BrowserAdapter, ScrapePlan};
pub use definition::{
    ExtractionSelectors, FallbackLink, RegionalRoute, ResponseMapping, SearchMethod,
    SourceDefinition, SourceMetadata,
};
pub use error::{AdapterError, AdapterResult, Result, SourceError};
pub use fallback::FallbackLinks;
pub use loader::SourceLoader;
pub use locale::LocaleSignal;
pub use parser::{RawListing, ResultParser};
pub use registry::SourceRegistry;
pub use rest::RestAdapter;
