//! The adapter contract and construction of the adapter set.

use crate::browser::BrowserAdapter;
use crate::definition::SourceDefinition;
use crate::error::{AdapterResult, Result, SourceError};
use crate::locale::LocaleSignal;
use crate::registry::SourceRegistry;
use crate::rest::RestAdapter;
use async_trait::async_trait;
use jobmesh_browser::BrowserEngine;
use jobmesh_core::{ListingDraft, SourceId, SourceTier, SourcesConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One job source the orchestrator can query.
///
/// Implementations return typed errors; the orchestrator is the only place
/// an error is turned into an empty result.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source tag stamped on every listing this adapter produces
    fn source_id(&self) -> &SourceId;

    /// Pipeline tier this adapter runs in
    fn tier(&self) -> SourceTier;

    /// Whether the adapter is relevant for the caller's locale
    fn serves(&self, locale: &LocaleSignal) -> bool;

    /// Query the source
    async fn fetch_listings(&self, query: &str, location: &str) -> AdapterResult<Vec<ListingDraft>>;
}

/// Build adapters for every enabled definition in the registry.
///
/// REST definitions always get an adapter; browser definitions only when an
/// engine is available. Adapters are returned in source-id order.
pub fn build_adapters(
    registry: &SourceRegistry,
    engine: Option<Arc<BrowserEngine>>,
    config: &SourcesConfig,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(SourceError::Client)?;

    let mut definitions: Vec<SourceDefinition> = registry
        .get_all()
        .into_iter()
        .filter(|def| def.source.enabled)
        .collect();
    definitions.sort_by(|a, b| a.id().cmp(b.id()));

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(definitions.len());
    for definition in definitions {
        match definition.tier() {
            SourceTier::Rest => {
                adapters.push(Arc::new(RestAdapter::new(definition, client.clone())?));
            }
            SourceTier::Browser => match &engine {
                Some(engine) => {
                    let adapter = BrowserAdapter::new(definition, Arc::clone(engine))?;
                    adapters.push(Arc::new(adapter));
                }
                None => debug!(
                    source = %definition.id(),
                    "Browser engine unavailable, skipping browser source"
                ),
            },
            SourceTier::Fallback => {}
        }
    }

    info!(count = adapters.len(), "Built source adapters");
    Ok(adapters)
}
