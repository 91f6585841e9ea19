//! Application state shared by every handler.

use jobmesh_aggregator::{AggregationOrchestrator, RelevanceRanker};
use jobmesh_core::AppConfig;
use jobmesh_db::Database;
use jobmesh_enrich::EnrichmentWriter;
use jobmesh_sources::{FallbackLinks, SourceAdapter};
use std::sync::Arc;

/// Long-lived services, built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Listing database
    pub db: Arc<Database>,
    /// Aggregation pipeline
    pub orchestrator: Arc<AggregationOrchestrator>,
    /// Search over stored listings
    pub ranker: Arc<RelevanceRanker>,
    /// Enrichment write pass
    pub enrichment: Arc<EnrichmentWriter>,
}

impl AppState {
    /// Wire the pipeline around an open, migrated database.
    pub fn new(
        config: &AppConfig,
        db: Arc<Database>,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        fallback: FallbackLinks,
    ) -> Self {
        let orchestrator = AggregationOrchestrator::new(
            adapters,
            fallback,
            db.clone(),
            config.aggregation.clone(),
        );
        let ranker = RelevanceRanker::new(db.clone(), config.ranking.clone());
        let enrichment = EnrichmentWriter::new(db.clone(), config.enrichment.max_bytes);

        Self {
            db,
            orchestrator: Arc::new(orchestrator),
            ranker: Arc::new(ranker),
            enrichment: Arc::new(enrichment),
        }
    }
}
