//! Job aggregation, search and enrichment handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobmesh_aggregator::{AggregateError, AggregationSummary, SearchPage, SearchRequest};
use jobmesh_db::listings;
use jobmesh_enrich::EnrichmentOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

/// Body of `POST /api/jobs/aggregate`.
#[derive(Debug, Deserialize)]
pub struct AggregateBody {
    /// Free-text query
    #[serde(default)]
    pub query: String,
    /// Location hint
    #[serde(default)]
    pub location: String,
    /// Store the results
    #[serde(default)]
    pub persist: bool,
}

/// Response of `POST /api/jobs/aggregate`, success or not.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    /// Whether the run completed
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Listings after merge and cap
    pub total_extracted: usize,
    /// Newly stored listings
    pub saved_count: usize,
    /// Listings already stored
    pub skipped_count: usize,
    /// Listings that could not be stored
    pub failed_count: usize,
    /// Listings dropped for a missing title or apply URL
    pub rejected_count: usize,
    /// Whether the listings are search links
    pub used_fallback: bool,
    /// Stored or extracted listings
    pub jobs: Value,
}

impl AggregateResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            total_extracted: 0,
            saved_count: 0,
            skipped_count: 0,
            failed_count: 0,
            rejected_count: 0,
            used_fallback: false,
            jobs: Value::Array(Vec::new()),
        }
    }

    fn from_summary(summary: AggregationSummary, persist: bool) -> Self {
        let message = if summary.used_fallback {
            format!(
                "No listings found; returning {} board search links",
                summary.total_extracted
            )
        } else if persist {
            format!(
                "Found {} jobs: {} saved, {} already stored, {} failed",
                summary.total_extracted,
                summary.saved_count,
                summary.skipped_count,
                summary.failed_count
            )
        } else {
            format!("Found {} jobs", summary.total_extracted)
        };

        Self {
            success: true,
            message,
            total_extracted: summary.total_extracted,
            saved_count: summary.saved_count,
            skipped_count: summary.skipped_count,
            failed_count: summary.failed_count,
            rejected_count: summary.rejected_count,
            used_fallback: summary.used_fallback,
            jobs: serde_json::to_value(&summary.jobs).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to serialize aggregated jobs");
                Value::Array(Vec::new())
            }),
        }
    }
}

/// `POST /api/jobs/aggregate`
pub async fn aggregate(
    State(state): State<AppState>,
    Json(body): Json<AggregateBody>,
) -> (StatusCode, Json<AggregateResponse>) {
    info!(
        query = %body.query,
        location = %body.location,
        persist = body.persist,
        "Aggregate request"
    );

    match state
        .orchestrator
        .aggregate(&body.query, &body.location, body.persist)
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(AggregateResponse::from_summary(summary, body.persist)),
        ),
        Err(e) => {
            let status = match &e {
                AggregateError::EmptyQuery => StatusCode::BAD_REQUEST,
                AggregateError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AggregateError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_server_error() {
                error!(error = %e, "Aggregation failed");
            }
            (status, Json(AggregateResponse::failure(e.to_string())))
        }
    }
}

/// Query string of `GET /api/jobs/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query
    #[serde(default)]
    pub q: Option<String>,
    /// Location filter
    #[serde(default)]
    pub location: Option<String>,
    /// Employment-type filter
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    /// 1-based page
    #[serde(default)]
    pub page: Option<usize>,
    /// Page size
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl From<SearchParams> for SearchRequest {
    fn from(params: SearchParams) -> Self {
        let mut request = SearchRequest::new(params.q.unwrap_or_default());
        request.location = params.location;
        request.job_type = params.job_type;
        if let Some(page) = params.page {
            request.page = page;
        }
        if let Some(per_page) = params.per_page {
            request.per_page = per_page;
        }
        request
    }
}

/// `GET /api/jobs/search`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, ApiError> {
    let request = SearchRequest::from(params);
    let page = state.ranker.search(&request).await?;
    Ok(Json(page))
}

/// `PUT /api/jobs/:id/enrichment`
pub async fn enrich(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<EnrichmentOutcome>, ApiError> {
    let listing = listings::get_by_id(state.db.pool(), &id).await?;
    let outcome = state.enrichment.apply(&listing, &payload).await?;
    Ok(Json(outcome))
}
