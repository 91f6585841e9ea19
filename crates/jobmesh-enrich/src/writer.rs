//! Enrichment write pass.

use crate::error::Result;
use crate::storage::stringify_for_storage;
use crate::validate::parse_enhanced;
use chrono::Utc;
use jobmesh_core::slugify;
use jobmesh_db::{ListingStore, StoredListing};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

const ID_PREFIX_LEN: usize = 8;

/// What was written for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentOutcome {
    /// Slug now attached to the listing
    pub slug: String,
    /// Size of the stored payload in bytes
    pub stored_bytes: usize,
}

/// Validates generated content and attaches it to stored listings.
pub struct EnrichmentWriter {
    store: Arc<dyn ListingStore>,
    max_bytes: usize,
}

impl EnrichmentWriter {
    /// Create a writer with the given byte budget.
    #[must_use]
    pub fn new(store: Arc<dyn ListingStore>, max_bytes: usize) -> Self {
        Self { store, max_bytes }
    }

    /// Validate `raw`, bound it and persist it with a slug.
    ///
    /// The payload is marked enhanced; `enhancedAt` defaults to now.
    ///
    /// # Errors
    /// Returns `EnrichError::NotAnObject` for non-object input and
    /// `EnrichError::Store` when the update fails.
    pub async fn apply(&self, listing: &StoredListing, raw: &Value) -> Result<EnrichmentOutcome> {
        let mut content = parse_enhanced(raw)?;
        content.is_enhanced = true;
        content.enhanced_at.get_or_insert_with(Utc::now);

        let payload = stringify_for_storage(&content, self.max_bytes);
        let slug = listing_slug(listing);

        self.store
            .attach_enrichment(&listing.id, &payload, &slug)
            .await?;

        info!(
            listing = %listing.id,
            slug = %slug,
            bytes = payload.len(),
            "stored enrichment"
        );

        Ok(EnrichmentOutcome {
            slug,
            stored_bytes: payload.len(),
        })
    }
}

/// `slugify(title-company)` followed by the first characters of the id.
#[must_use]
pub fn listing_slug(listing: &StoredListing) -> String {
    let base = slugify(&format!("{} {}", listing.title, listing.company));
    let prefix: String = listing
        .id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(ID_PREFIX_LEN)
        .collect::<String>()
        .to_ascii_lowercase();
    if prefix.is_empty() {
        base
    } else {
        format!("{base}-{prefix}")
    }
}
