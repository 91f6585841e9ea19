//! Multi-field relevance ranking over stored listings.
//!
//! A query fans out into one store search per field. Hits are merged per
//! document, scored, filtered and paginated in memory.

use crate::error::{AggregateError, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use jobmesh_core::{contains_phrase, normalize, tokenize, RankingConfig, RankingWeights};
use jobmesh_db::{ListingStore, SearchField, StoredListing};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

const fn default_page() -> usize {
    1
}

const fn default_per_page() -> usize {
    20
}

/// A search request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text query; blank means "most recent"
    #[serde(default)]
    pub query: String,
    /// Optional location filter
    #[serde(default)]
    pub location: Option<String>,
    /// Optional employment-type filter
    #[serde(default)]
    pub job_type: Option<String>,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: usize,
    /// Page size
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl SearchRequest {
    /// A first-page request for `query`.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: None,
            job_type: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }

    /// Filter by location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Filter by employment type.
    #[must_use]
    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = Some(job_type.into());
        self
    }

    /// Select a page.
    #[must_use]
    pub fn with_page(mut self, page: usize, per_page: usize) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }
}

/// One page of ranked results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Listings on this page, best first
    pub documents: Vec<StoredListing>,
    /// Matching listings across all pages
    pub total: usize,
    /// Effective page number
    pub page: usize,
    /// Effective page size
    pub per_page: usize,
}

struct Candidate {
    listing: StoredListing,
    fields: HashSet<SearchField>,
}

/// Scores and pages stored listings for a free-text query.
pub struct RelevanceRanker {
    store: Arc<dyn ListingStore>,
    config: RankingConfig,
}

impl RelevanceRanker {
    /// Create a ranker over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ListingStore>, config: RankingConfig) -> Self {
        Self { store, config }
    }

    /// Run a search.
    ///
    /// A blank query with no filters pages through the whole store newest
    /// first. With filters, a blank query considers only the most recent
    /// `per_field_limit` listings.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        if let Err(e) = self.store.ping().await {
            return Err(AggregateError::StoreUnavailable(e));
        }

        let page = request.page.max(1);
        let per_page = request.per_page.clamp(1, self.config.max_per_page.max(1));
        let phrase = normalize(&request.query);
        let unfiltered = non_blank(request.location.as_deref()).is_none()
            && non_blank(request.job_type.as_deref()).is_none();

        let (ranked, total) = if phrase.is_empty() && unfiltered {
            let total = self
                .store
                .count()
                .await
                .map_err(AggregateError::from_store)?;
            let recent = self
                .store
                .recent(page.saturating_mul(per_page))
                .await
                .map_err(AggregateError::from_store)?;
            (recent, total)
        } else if phrase.is_empty() {
            let recent = self
                .store
                .recent(self.config.per_field_limit)
                .await
                .map_err(AggregateError::from_store)?;
            let filtered = self.apply_filters(recent, request);
            let total = filtered.len();
            (filtered, total)
        } else {
            let candidates = self.collect_candidates(&phrase).await?;
            let tokens = unique_tokens(&phrase);
            let now = Utc::now();
            let weights = &self.config.weights;
            let mut scored: Vec<(f64, StoredListing)> = candidates
                .into_iter()
                .map(|c| (score(&c, &phrase, &tokens, weights, now), c.listing))
                .collect();
            scored.sort_by(|(sa, a), (sb, b)| {
                sb.total_cmp(sa)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            });
            let ordered = scored.into_iter().map(|(_, listing)| listing).collect();
            let filtered = self.apply_filters(ordered, request);
            let total = filtered.len();
            (filtered, total)
        };

        let documents = ranked
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        debug!(query = %phrase, total, page, per_page, "Search complete");
        Ok(SearchPage {
            documents,
            total,
            page,
            per_page,
        })
    }

    /// Query every field concurrently and merge hits per document, keeping
    /// first-seen order.
    async fn collect_candidates(&self, phrase: &str) -> Result<Vec<Candidate>> {
        let mut terms = vec![phrase.to_string()];
        for token in unique_tokens(phrase) {
            if !terms.contains(&token) {
                terms.push(token);
            }
        }

        let limit = self.config.per_field_limit;
        let searches = SearchField::ALL.iter().map(|&field| {
            let terms = &terms;
            async move { (field, self.store.search_field(field, terms, limit).await) }
        });

        let mut order: Vec<String> = Vec::new();
        let mut by_id: HashMap<String, Candidate> = HashMap::new();

        for (field, outcome) in join_all(searches).await {
            let hits = match outcome {
                Ok(hits) => hits,
                Err(e) if e.is_unavailable() => return Err(AggregateError::StoreUnavailable(e)),
                Err(e) => {
                    warn!(%field, error = %e, "Field search failed, ignoring field");
                    continue;
                }
            };
            for listing in hits {
                by_id
                    .entry(listing.id.clone())
                    .or_insert_with(|| {
                        order.push(listing.id.clone());
                        Candidate {
                            listing,
                            fields: HashSet::new(),
                        }
                    })
                    .fields
                    .insert(field);
            }
        }

        Ok(order
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect())
    }

    /// Job type is strict. Location degrades: when nothing matches it, it is
    /// ignored.
    fn apply_filters(
        &self,
        listings: Vec<StoredListing>,
        request: &SearchRequest,
    ) -> Vec<StoredListing> {
        let listings: Vec<StoredListing> = match non_blank(request.job_type.as_deref()) {
            Some(job_type) => listings
                .into_iter()
                .filter(|l| {
                    l.job_type
                        .as_deref()
                        .is_some_and(|t| contains_phrase(t, job_type))
                })
                .collect(),
            None => listings,
        };

        let Some(location) = non_blank(request.location.as_deref()) else {
            return listings;
        };

        let mut needles = tokenize(location);
        if needles.is_empty() {
            needles.push(normalize(location));
        }
        let matching: Vec<StoredListing> = listings
            .iter()
            .filter(|l| needles.iter().any(|n| contains_phrase(&l.location, n)))
            .cloned()
            .collect();

        if matching.is_empty() {
            debug!(location, "No listing matches location, ignoring location filter");
            listings
        } else {
            matching
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn unique_tokens(phrase: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(phrase)
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

fn score(
    candidate: &Candidate,
    phrase: &str,
    tokens: &[String],
    weights: &RankingWeights,
    now: DateTime<Utc>,
) -> f64 {
    let listing = &candidate.listing;
    let title = normalize(&listing.title);
    let company = normalize(&listing.company);
    let description = normalize(&listing.description);
    let mut total = 0.0;

    if title.contains(phrase) {
        total += weights.exact_title;
    }
    if company.contains(phrase) {
        total += weights.exact_company;
    }
    if description.contains(phrase) {
        total += weights.exact_description;
    }

    for field in &candidate.fields {
        total += match field {
            SearchField::Title => weights.field_title,
            SearchField::Company => weights.field_company,
            SearchField::Description => weights.field_description,
            SearchField::Location => weights.field_location,
        };
    }
    match candidate.fields.len() {
        0 | 1 => {}
        2 => total += weights.multi_field_two,
        _ => total += weights.multi_field_three,
    }

    for token in tokens {
        if title.contains(token.as_str()) {
            total += weights.token_title;
        }
        if company.contains(token.as_str()) {
            total += weights.token_company;
        }
        if description.contains(token.as_str()) {
            total += weights.token_description;
        }
    }

    if title.starts_with(phrase) {
        total += weights.title_prefix;
    }

    total + recency_bonus(listing.created_at, now, weights)
}

fn recency_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>, weights: &RankingWeights) -> f64 {
    let age_hours = (now - created_at).num_hours();
    match age_hours {
        h if h < 24 => weights.recency_day,
        h if h < 72 => weights.recency_three_days,
        h if h < 24 * 7 => weights.recency_week,
        h if h < 24 * 14 => weights.recency_two_weeks,
        _ => 0.0,
    }
}
