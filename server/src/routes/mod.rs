//! HTTP routes.

mod health;
mod jobs;

pub use health::{health, HealthStatus};
pub use jobs::{aggregate, enrich, search, AggregateBody, AggregateResponse, SearchParams};

use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/jobs/aggregate", post(aggregate))
        .route("/api/jobs/search", get(search))
        .route("/api/jobs/:id/enrichment", put(enrich))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
