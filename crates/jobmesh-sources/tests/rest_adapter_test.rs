//! REST adapter against a local HTTP server.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use jobmesh_core::{SourceId, SourceTier, SourcesConfig};
use jobmesh_sources::{
    build_adapters, AdapterError, ResponseMapping, SearchMethod, SourceDefinition,
    SourceMetadata, SourceRegistry,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

async fn jobs(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let search = params.get("search").cloned().unwrap_or_default();
    Json(json!({
        "echo": search,
        "jobs": [
            {"title": "Staff Accountant", "company_name": "Acme", "url": "https://acme.test/1",
             "candidate_required_location": "Bangladesh", "tags": ["finance"]},
            {"title": "Rust Engineer", "company_name": "Initech", "url": "https://initech.test/2",
             "tags": ["rust"]},
            {"title": "Accountant (no link)", "company_name": "Hooli"}
        ]
    }))
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/jobs", get(jobs))
        .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/garbage", get(|| async { "<html>not json</html>" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn definition(id: &str, endpoint: String) -> SourceDefinition {
    SourceDefinition {
        source: SourceMetadata {
            id: SourceId::new(id).expect("valid source ID"),
            name: id.to_string(),
            url: endpoint.clone(),
            domain: "127.0.0.1".to_string(),
            region_relevance: vec!["global".to_string()],
            enabled: true,
            max_results: 20,
        },
        search: SearchMethod::RestApi {
            endpoint,
            query_param: Some("search".to_string()),
            location_param: None,
            params: BTreeMap::new(),
            response: ResponseMapping {
                items_path: "jobs".to_string(),
                title: "title".to_string(),
                company: "company_name".to_string(),
                url: "url".to_string(),
                location: Some("candidate_required_location".to_string()),
                description: None,
                salary: None,
                job_type: None,
                tags: Some("tags".to_string()),
                default_location: Some("Remote".to_string()),
            },
        },
        fallback: None,
    }
}

#[tokio::test]
async fn test_rest_adapter_round_trip() {
    let base = spawn_server().await;
    let registry = SourceRegistry::new();
    registry
        .insert(definition("local-jobs", format!("{base}/jobs")))
        .expect("insert definition");

    let adapters =
        build_adapters(&registry, None, &SourcesConfig::default()).expect("build adapters");
    assert_eq!(adapters.len(), 1);
    assert_eq!(adapters[0].tier(), SourceTier::Rest);

    let drafts = adapters[0]
        .fetch_listings("Accountant", "Bangladesh")
        .await
        .expect("fetch listings");

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Staff Accountant");
    assert_eq!(drafts[0].location, "Bangladesh");
    assert_eq!(drafts[0].source.as_str(), "local-jobs");
}

#[tokio::test]
async fn test_rest_adapter_http_error() {
    let base = spawn_server().await;
    let registry = SourceRegistry::new();
    registry
        .insert(definition("down-jobs", format!("{base}/down")))
        .expect("insert definition");

    let adapters =
        build_adapters(&registry, None, &SourcesConfig::default()).expect("build adapters");
    let result = adapters[0].fetch_listings("rust", "").await;
    assert!(matches!(result, Err(AdapterError::Http { status: 503, .. })));
}

#[tokio::test]
async fn test_rest_adapter_malformed_body() {
    let base = spawn_server().await;
    let registry = SourceRegistry::new();
    registry
        .insert(definition("garbage-jobs", format!("{base}/garbage")))
        .expect("insert definition");

    let adapters =
        build_adapters(&registry, None, &SourcesConfig::default()).expect("build adapters");
    let result = adapters[0].fetch_listings("rust", "").await;
    assert!(matches!(result, Err(AdapterError::Decode(_))));
}

#[tokio::test]
async fn test_rest_adapter_connection_refused() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let registry = SourceRegistry::new();
    registry
        .insert(definition("dead-jobs", format!("http://{addr}/jobs")))
        .expect("insert definition");

    let adapters =
        build_adapters(&registry, None, &SourcesConfig::default()).expect("build adapters");
    let result = adapters[0].fetch_listings("rust", "").await;
    assert!(matches!(result, Err(AdapterError::Network(_))));
}
