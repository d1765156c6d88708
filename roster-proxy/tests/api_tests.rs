//! Integration tests for roster-proxy endpoints
//!
//! A throwaway upstream runs on 127.0.0.1:0 and records what it receives;
//! the proxy router is driven with `oneshot`.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use roster_proxy::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

async fn upstream_filtered(
    State(seen): State<Seen>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.lock().unwrap().push((query, body));
    Json(json!({
        "row_count": 1,
        "response_schema": ["id", "Gender"],
        "response": [{"id": 7, "Gender": "FEMALE"}],
    }))
}

/// Test helper: start a fake upstream API, returning its base URL
async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn recording_upstream() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v1/chingu_members/table/filtered", post(upstream_filtered))
        .route(
            "/v1/chingu_members/Country_Code/UNIQUE",
            get(|| async { Json(json!(["CA", null, "NG"])) }),
        )
        .with_state(Arc::clone(&seen));
    (spawn_upstream(app).await, seen)
}

fn setup_app(upstream: &str, cors_origin: Option<&str>) -> Router {
    let state = AppState::with_client(reqwest::Client::new(), upstream);
    build_router(state, cors_origin)
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// =============================================================================
// Banner and health
// =============================================================================

#[tokio::test]
async fn test_root_banner() {
    let app = setup_app("http://127.0.0.1:9", None);
    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Endpoints: /members");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app("http://127.0.0.1:9", None);
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "roster-proxy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let app = setup_app("http://127.0.0.1:9", None);
    let response = app.oneshot(get_request("/build_info")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Forwarding
// =============================================================================

#[tokio::test]
async fn test_members_forwards_query_and_body() {
    let (upstream, seen) = recording_upstream().await;
    let app = setup_app(&upstream, None);

    let filters = json!({"include": {"Gender": ["FEMALE"]}, "exclude": {}});
    let response = app
        .oneshot(post_json("/members?offset=100&limit=100", filters.clone()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["row_count"], 1);
    assert_eq!(body["response"][0]["id"], 7);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("offset=100&limit=100"));
    assert_eq!(seen[0].1, filters);
}

#[tokio::test]
async fn test_members_empty_body_sent_as_empty_object() {
    let (upstream, seen) = recording_upstream().await;
    let app = setup_app(&upstream, None);

    let request = Request::builder()
        .method("POST")
        .uri("/members")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, None);
    assert_eq!(seen[0].1, json!({}));
}

#[tokio::test]
async fn test_countries_forwarded_verbatim() {
    let (upstream, _seen) = recording_upstream().await;
    let app = setup_app(&upstream, None);

    let response = app.oneshot(get_request("/countries")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!(["CA", null, "NG"]));
}

// =============================================================================
// Failure shape
// =============================================================================

#[tokio::test]
async fn test_upstream_error_status_becomes_500() {
    let upstream = spawn_upstream(Router::new().route(
        "/v1/chingu_members/table/filtered",
        post(|| async { (StatusCode::BAD_GATEWAY, "bigquery unavailable") }),
    ))
    .await;
    let app = setup_app(&upstream, None);

    let response = app
        .oneshot(post_json("/members?offset=0&limit=10", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Request failed");
    assert!(body["details"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn test_non_json_upstream_becomes_500() {
    let upstream = spawn_upstream(Router::new().route(
        "/v1/chingu_members/table/filtered",
        post(|| async { "<html>maintenance</html>" }),
    ))
    .await;
    let app = setup_app(&upstream, None);

    let response = app.oneshot(post_json("/members", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Request failed");
}

#[tokio::test]
async fn test_unreachable_upstream_becomes_500() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = setup_app(&format!("http://{}", addr), None);
    let response = app.oneshot(get_request("/countries")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Request failed");
    assert!(body["details"].is_string());
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_configured_origin() {
    let app = setup_app("http://127.0.0.1:9", Some("https://roster.example.org"));
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://roster.example.org")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://roster.example.org"
    );
}

#[tokio::test]
async fn test_cors_any_origin_when_unset() {
    let app = setup_app("http://127.0.0.1:9", None);
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_cors_preflight_allows_post() {
    let app = setup_app("http://127.0.0.1:9", None);
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/members")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
}
