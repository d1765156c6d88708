//! Forwarded endpoints
//!
//! The proxy does not interpret member queries: the JSON body and the
//! query string (`offset`, `limit`) go upstream untouched and the upstream
//! JSON comes back untouched.

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use reqwest::{header, RequestBuilder};
use roster_common::Error;
use serde_json::Value;
use tracing::debug;

use crate::{AppState, ProxyError};

/// GET /
pub async fn banner() -> &'static str {
    "Endpoints: /members"
}

/// POST /members
///
/// Replays the filter body against the upstream filtered-table endpoint.
/// An empty body is sent as `{}` (no filters).
pub async fn forward_members(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let mut url = state.filtered_table_url();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(&query);
    }

    let body = if body.is_empty() {
        Bytes::from_static(b"{}")
    } else {
        body
    };

    debug!(%url, bytes = body.len(), "Forwarding member query");

    let request = state
        .http_client
        .post(&url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body);

    relay(request).await
}

/// GET /countries
///
/// Distinct country codes present in the roster; may include `null`.
pub async fn forward_countries(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let url = state.country_codes_url();
    debug!(%url, "Forwarding country listing");

    relay(state.http_client.get(&url)).await
}

async fn relay(request: RequestBuilder) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let response = request
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Upstream {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let value: Value = response
        .json()
        .await
        .map_err(|e| Error::Decode(format!("Upstream body is not JSON: {}", e)))?;

    // reqwest and axum carry different `http` versions
    let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK);
    Ok((status, Json(value)))
}
