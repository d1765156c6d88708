//! HttpMemberSource against a throwaway local server

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use roster_client::{HttpMemberSource, MemberDirectory, MemberSource};
use roster_common::config::ClientConfig;
use roster_common::events::EventBus;
use roster_common::query::{Attribute, FilterBody, PageRequest};
use roster_common::Error;
use serde_json::{json, Value};

type Captured = Arc<Mutex<Vec<(HashMap<String, String>, Value)>>>;

async fn members_handler(
    State(captured): State<Captured>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let offset: i64 = params.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    captured.lock().unwrap().push((params, body));

    Json(json!({
        "row_count": 2,
        "response_schema": ["id", "Gender"],
        "response": [
            {"id": offset + 1, "Gender": "FEMALE"},
            {"id": offset + 2, "Gender": "MALE"},
        ],
    }))
}

async fn countries_handler() -> Json<Value> {
    Json(json!(["CA", null, "US"]))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetch_page_sends_window_and_filters() {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/members", post(members_handler))
        .with_state(Arc::clone(&captured));
    let base = spawn(app).await;

    let source = HttpMemberSource::new(format!("{}/", base), Duration::from_secs(5)).unwrap();
    let filters = FilterBody::new().include(Attribute::Gender, "FEMALE");
    let rows = source
        .fetch_page(PageRequest { offset: 100, limit: 100 }, &filters)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 101);

    let captured = captured.lock().unwrap();
    let (params, body) = &captured[0];
    assert_eq!(params["offset"], "100");
    assert_eq!(params["limit"], "100");
    assert_eq!(body["include"]["Gender"], json!(["FEMALE"]));
    assert_eq!(body["exclude"], json!({}));
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let app = Router::new().route(
        "/members",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Request failed") }),
    );
    let base = spawn(app).await;

    let source = HttpMemberSource::new(base, Duration::from_secs(5)).unwrap();
    let err = source
        .fetch_page(PageRequest { offset: 0, limit: 10 }, &FilterBody::new())
        .await
        .unwrap_err();

    match err {
        Error::Upstream { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Request failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparsable_body_is_decode_error() {
    let app = Router::new().route("/members", post(|| async { "not json" }));
    let base = spawn(app).await;

    let source = HttpMemberSource::new(base, Duration::from_secs(5)).unwrap();
    let err = source
        .fetch_page(PageRequest { offset: 0, limit: 10 }, &FilterBody::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpMemberSource::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = source
        .fetch_page(PageRequest { offset: 0, limit: 10 }, &FilterBody::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(err.is_fetch_failure());
}

#[tokio::test]
async fn test_fetch_countries_keeps_nulls() {
    let app = Router::new().route("/countries", get(countries_handler));
    let base = spawn(app).await;

    let source = HttpMemberSource::new(base, Duration::from_secs(5)).unwrap();
    let codes = source.fetch_countries().await.unwrap();
    assert_eq!(codes, vec![Some("CA".to_string()), None, Some("US".to_string())]);
}

#[tokio::test]
async fn test_from_config_uses_api_base_url() {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/members", post(members_handler))
        .with_state(Arc::clone(&captured));
    let base = spawn(app).await;

    let config = ClientConfig {
        api_base_url: format!("{}/", base),
        timeout_secs: 5,
        ..ClientConfig::default()
    };
    let source = HttpMemberSource::from_config(&config).unwrap();
    assert_eq!(source.base_url(), base);

    let rows = source
        .fetch_page(PageRequest { offset: 0, limit: 2 }, &FilterBody::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(captured.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_connected_directory_builds_search_options() {
    let app = Router::new().route("/countries", get(countries_handler));
    let base = spawn(app).await;

    let config = ClientConfig {
        api_base_url: base,
        ..ClientConfig::default()
    };
    let dir = MemberDirectory::<HttpMemberSource>::connect(&config, EventBus::default()).unwrap();
    let options = dir.search_options().await.unwrap();

    let codes: Vec<&str> = options.countries.iter().map(|(code, _)| code.as_str()).collect();
    assert_eq!(codes, vec!["CA", "US"]);
    assert_eq!(options.solo_project_tiers, vec![1, 2, 3]);
    assert!(options.genders.contains(&"Female".to_string()));
}
