//! Aggregation orchestrator.
//!
//! Runs the REST tier, then the browser tier when REST yields too little,
//! merges and deduplicates the results, falls back to synthetic search links
//! when nothing was found, and optionally persists the batch.

use crate::error::{AggregateError, Result};
use futures::future::join_all;
use jobmesh_core::{AggregationConfig, ListingDraft, SourceTier};
use jobmesh_db::{DatabaseError, ListingStore, StoredListing};
use jobmesh_sources::{FallbackLinks, LocaleSignal, SourceAdapter};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// What one adapter contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    /// Source that was queried
    pub source: String,
    /// Tier the source ran in
    pub tier: SourceTier,
    /// Listings returned (before dedup)
    pub count: usize,
    /// Why the source failed or had listings rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time spent on the source
    pub elapsed_ms: u64,
}

/// Listings returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregatedJobs {
    /// Records saved during this run
    Stored(Vec<StoredListing>),
    /// The merged batch, when nothing was saved
    Extracted(Vec<ListingDraft>),
}

impl AggregatedJobs {
    /// Number of listings.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Stored(jobs) => jobs.len(),
            Self::Extracted(jobs) => jobs.len(),
        }
    }

    /// Whether there are no listings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSummary {
    /// Listings after merge, dedup, fallback and cap
    pub total_extracted: usize,
    /// Newly stored listings
    pub saved_count: usize,
    /// Listings already in the store
    pub skipped_count: usize,
    /// Listings that could not be stored, including rejected ones when
    /// persisting
    pub failed_count: usize,
    /// Listings dropped for a missing title or apply URL
    pub rejected_count: usize,
    /// Whether the result is synthetic search links
    pub used_fallback: bool,
    /// Whether the browser tier ran
    pub browser_tier_ran: bool,
    /// Per-source outcomes
    pub source_reports: Vec<SourceReport>,
    /// The listings themselves
    pub jobs: AggregatedJobs,
}

/// A draft dropped during merge.
#[derive(Debug)]
struct Rejection {
    source: String,
    reason: &'static str,
}

#[derive(Debug, Default)]
struct PersistOutcome {
    saved: Vec<StoredListing>,
    skipped: usize,
    failed: usize,
}

/// Coordinates adapters, dedup, fallback and persistence.
pub struct AggregationOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    fallback: FallbackLinks,
    store: Arc<dyn ListingStore>,
    settings: AggregationConfig,
    adapter_timeout: Duration,
}

impl AggregationOrchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        fallback: FallbackLinks,
        store: Arc<dyn ListingStore>,
        settings: AggregationConfig,
    ) -> Self {
        let adapter_timeout = Duration::from_secs(settings.adapter_timeout_secs);
        Self {
            adapters,
            fallback,
            store,
            settings,
            adapter_timeout,
        }
    }

    /// Set the REST yield below which the browser tier runs.
    #[must_use]
    pub fn with_browser_tier_threshold(mut self, threshold: usize) -> Self {
        self.settings.browser_tier_threshold = threshold;
        self
    }

    /// Set the maximum number of listings returned.
    #[must_use]
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.settings.result_cap = cap;
        self
    }

    /// Set the per-adapter time budget.
    #[must_use]
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Number of configured adapters.
    #[must_use]
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Aggregate listings for `query` near `location`.
    ///
    /// Adapter failures only show up in `source_reports`. The run fails only
    /// for a blank query or, when `persist` is set, an unreachable store.
    pub async fn aggregate(
        &self,
        query: &str,
        location: &str,
        persist: bool,
    ) -> Result<AggregationSummary> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AggregateError::EmptyQuery);
        }
        let location = location.trim();

        let locale = LocaleSignal::detect(location);
        let (rest, browser): (Vec<_>, Vec<_>) = self
            .adapters
            .iter()
            .filter(|adapter| adapter.serves(&locale))
            .filter(|adapter| adapter.tier() != SourceTier::Fallback)
            .cloned()
            .partition(|adapter| adapter.tier() == SourceTier::Rest);

        debug!(
            query,
            location,
            ?locale,
            rest = rest.len(),
            browser = browser.len(),
            "Selected adapters"
        );

        let mut reports = Vec::new();
        let mut batches = self.run_tier(&rest, query, location, &mut reports).await;
        let rest_yield: usize = batches
            .iter()
            .flatten()
            .filter(|draft| draft.has_apply_url())
            .count();

        let browser_tier_ran =
            rest_yield < self.settings.browser_tier_threshold && !browser.is_empty();
        if browser_tier_ran {
            info!(
                rest_yield,
                threshold = self.settings.browser_tier_threshold,
                "REST yield below threshold, running browser tier"
            );
            let browser_batches = self.run_tier(&browser, query, location, &mut reports).await;
            batches.extend(browser_batches);
        } else {
            debug!(rest_yield, "Skipping browser tier");
        }

        let (mut merged, rejected) = self.merge(batches.into_iter().flatten());
        note_rejections(&mut reports, &rejected);
        let used_fallback = merged.is_empty();
        if used_fallback {
            info!(
                query,
                location,
                "No listings from any source, using fallback links"
            );
            merged = self.merge(self.fallback.generate(query, location)).0;
        }
        merged.truncate(self.settings.result_cap);

        info!(
            total = merged.len(),
            used_fallback,
            browser_tier_ran,
            "Aggregation merged"
        );

        // Search links are never stored as listings.
        let outcome = if persist {
            let to_store: &[ListingDraft] = if used_fallback { &[] } else { &merged };
            self.persist(to_store).await?
        } else {
            PersistOutcome::default()
        };

        let total_extracted = merged.len();
        let saved_count = outcome.saved.len();
        let rejected_count = rejected.len();
        let failed_count = if persist {
            outcome.failed + rejected_count
        } else {
            outcome.failed
        };
        let jobs = if outcome.saved.is_empty() {
            AggregatedJobs::Extracted(merged)
        } else {
            AggregatedJobs::Stored(outcome.saved)
        };

        Ok(AggregationSummary {
            total_extracted,
            saved_count,
            skipped_count: outcome.skipped,
            failed_count,
            rejected_count,
            used_fallback,
            browser_tier_ran,
            source_reports: reports,
            jobs,
        })
    }

    /// Run every adapter in a tier concurrently; all settle, none cancel.
    async fn run_tier(
        &self,
        adapters: &[Arc<dyn SourceAdapter>],
        query: &str,
        location: &str,
        reports: &mut Vec<SourceReport>,
    ) -> Vec<Vec<ListingDraft>> {
        let budget = self.adapter_timeout;

        let runs = adapters.iter().map(|adapter| async move {
            let started = Instant::now();
            let fetch = adapter.fetch_listings(query, location);
            let outcome = tokio::time::timeout(budget, fetch).await;
            let elapsed = started.elapsed().as_millis();
            let elapsed_ms = u64::try_from(elapsed).unwrap_or(u64::MAX);
            let source = adapter.source_id().to_string();

            let (listings, error) = match outcome {
                Ok(Ok(listings)) => {
                    debug!(
                        source = %source,
                        count = listings.len(),
                        elapsed_ms,
                        "Adapter finished"
                    );
                    (listings, None)
                }
                Ok(Err(e)) => {
                    warn!(source = %source, error = %e, "Adapter failed, treating as empty");
                    (Vec::new(), Some(e.to_string()))
                }
                Err(_) => {
                    warn!(source = %source, ?budget, "Adapter timed out, treating as empty");
                    let message = format!("timed out after {}ms", budget.as_millis());
                    (Vec::new(), Some(message))
                }
            };

            let report = SourceReport {
                source,
                tier: adapter.tier(),
                count: listings.len(),
                error,
                elapsed_ms,
            };
            (listings, report)
        });

        join_all(runs)
            .await
            .into_iter()
            .map(|(listings, report)| {
                reports.push(report);
                listings
            })
            .collect()
    }

    /// Finalize, reject unusable drafts and dedup by identity key (first
    /// wins).
    fn merge(
        &self,
        drafts: impl IntoIterator<Item = ListingDraft>,
    ) -> (Vec<ListingDraft>, Vec<Rejection>) {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut rejected = Vec::new();

        for draft in drafts {
            let draft = draft.finalize(self.settings.description_max_chars);
            let reason = if !draft.has_apply_url() {
                Some("missing apply URL")
            } else if draft.title.is_empty() {
                Some("missing title")
            } else {
                None
            };
            if let Some(reason) = reason {
                warn!(source = %draft.source, title = %draft.title, reason, "Rejecting listing");
                rejected.push(Rejection {
                    source: draft.source.to_string(),
                    reason,
                });
                continue;
            }
            if seen.insert(draft.identity_key.clone()) {
                merged.push(draft);
            } else {
                debug!(key = %draft.identity_key, "Dropping duplicate listing");
            }
        }

        (merged, rejected)
    }

    /// Persist sequentially: exists → skip, else create.
    async fn persist(&self, drafts: &[ListingDraft]) -> Result<PersistOutcome> {
        if let Err(e) = self.store.ping().await {
            error!(error = %e, "Listing store unreachable");
            return Err(AggregateError::StoreUnavailable(e));
        }

        let mut outcome = PersistOutcome::default();
        for draft in drafts {
            match self.store.exists(&draft.identity_key).await {
                Ok(true) => {
                    outcome.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    Self::record_failure(draft, e, &mut outcome)?;
                    continue;
                }
            }

            match self.store.create(draft).await {
                Ok(stored) => outcome.saved.push(stored),
                Err(DatabaseError::Duplicate(_)) => outcome.skipped += 1,
                Err(e) => Self::record_failure(draft, e, &mut outcome)?,
            }
        }

        info!(
            saved = outcome.saved.len(),
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Persisted aggregation batch"
        );
        Ok(outcome)
    }

    fn record_failure(
        draft: &ListingDraft,
        e: DatabaseError,
        outcome: &mut PersistOutcome,
    ) -> Result<()> {
        if e.is_unavailable() {
            error!(error = %e, "Listing store became unreachable mid-batch");
            return Err(AggregateError::StoreUnavailable(e));
        }
        warn!(
            title = %draft.title,
            source = %draft.source,
            error = %e,
            "Failed to store listing"
        );
        outcome.failed += 1;
        Ok(())
    }
}

/// Append per-source rejection counts to the matching reports.
fn note_rejections(reports: &mut [SourceReport], rejected: &[Rejection]) {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for rejection in rejected {
        *counts
            .entry((rejection.source.as_str(), rejection.reason))
            .or_default() += 1;
    }

    for ((source, reason), count) in counts {
        let Some(report) = reports.iter_mut().find(|r| r.source == source) else {
            continue;
        };
        let note = format!("{count} listings rejected: {reason}");
        report.error = Some(match report.error.take() {
            Some(existing) => format!("{existing}; {note}"),
            None => note,
        });
    }
}
