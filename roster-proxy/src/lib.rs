//! roster-proxy library - member API forwarding server
//!
//! Browsers cannot call the hosted member API directly (CORS, fixed origin),
//! so this server accepts the directory's filtered queries and replays them
//! against the upstream filtered-table endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use reqwest::Client;
use roster_common::config::ProxyConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod error;

pub use error::ProxyError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Pooled client for upstream requests
    pub http_client: Client,
    /// Upstream API root, without trailing slash
    pub upstream_url: Arc<str>,
}

impl AppState {
    /// Build state from the `[proxy]` config section
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProxyError::Setup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(http_client, &config.upstream_url))
    }

    pub fn with_client(http_client: Client, upstream_url: &str) -> Self {
        Self {
            http_client,
            upstream_url: Arc::from(upstream_url.trim_end_matches('/')),
        }
    }

    pub fn filtered_table_url(&self) -> String {
        format!("{}/v1/chingu_members/table/filtered", self.upstream_url)
    }

    pub fn country_codes_url(&self) -> String {
        format!("{}/v1/chingu_members/Country_Code/UNIQUE", self.upstream_url)
    }
}

/// CORS policy: the configured origin, or any origin when unset
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!("Invalid CORS origin ({}), allowing any origin", e);
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build application router
pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::banner))
        .route("/members", post(api::forward_members))
        .route("/countries", get(api::forward_countries))
        .merge(api::health_routes())
        .with_state(state)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}
