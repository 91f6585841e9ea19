//! The persistence seam used by the aggregator and ranker.

use crate::error::Result;
use crate::listings::{self, SearchField, StoredListing};
use crate::Database;
use async_trait::async_trait;
use jobmesh_core::ListingDraft;

/// Listing persistence operations the pipeline depends on.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Whether a listing with this identity key is stored.
    async fn exists(&self, source_key: &str) -> Result<bool>;

    /// Persist a draft.
    async fn create(&self, draft: &ListingDraft) -> Result<StoredListing>;

    /// Single-column search, newest first.
    async fn search_field(
        &self,
        field: SearchField,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<StoredListing>>;

    /// Most recent listings.
    async fn recent(&self, limit: usize) -> Result<Vec<StoredListing>>;

    /// Total number of stored listings.
    async fn count(&self) -> Result<usize>;

    /// Store a serialized enrichment payload and slug.
    async fn attach_enrichment(&self, id: &str, payload: &str, slug: &str) -> Result<()>;
}

#[async_trait]
impl ListingStore for Database {
    async fn ping(&self) -> Result<()> {
        Database::ping(self).await
    }

    async fn exists(&self, source_key: &str) -> Result<bool> {
        listings::exists_by_source_key(self.pool(), source_key).await
    }

    async fn create(&self, draft: &ListingDraft) -> Result<StoredListing> {
        listings::create_listing(self.pool(), draft).await
    }

    async fn search_field(
        &self,
        field: SearchField,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<StoredListing>> {
        listings::search_field(self.pool(), field, terms, limit).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredListing>> {
        listings::list_recent(self.pool(), limit).await
    }

    async fn count(&self) -> Result<usize> {
        let total = listings::count(self.pool()).await?;
        Ok(usize::try_from(total).unwrap_or_default())
    }

    async fn attach_enrichment(&self, id: &str, payload: &str, slug: &str) -> Result<()> {
        listings::attach_enrichment(self.pool(), id, payload, slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobmesh_core::SourceId;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_database_as_trait_object() {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");
        let store: Arc<dyn ListingStore> = Arc::new(db);

        store.ping().await.expect("ping");

        let draft = ListingDraft::new(
            SourceId::new("jobicy").expect("valid source ID"),
            "Data Analyst",
            "Numbers Inc",
            "Remote",
            "https://jobicy.test/data-analyst",
        )
        .finalize(2000);

        assert!(!store.exists(&draft.identity_key).await.expect("exists"));
        let stored = store.create(&draft).await.expect("create");
        assert!(store.exists(&draft.identity_key).await.expect("exists"));

        let recent = store.recent(5).await.expect("recent");
        assert_eq!(recent.len(), 1);
        assert_eq!(store.count().await.expect("count"), 1);
        assert_eq!(recent[0].id, stored.id);
    }
}
