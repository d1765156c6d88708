//! Forwarding failures and their HTTP shape

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream call failed (transport, status or body)
    #[error(transparent)]
    Forward(#[from] roster_common::Error),

    /// Server could not be assembled
    #[error("Setup error: {0}")]
    Setup(String),
}

/// Every failure reaches the browser as the same 500 body
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let details = self.to_string();
        error!("Request failed: {}", details);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Request failed",
                "details": details,
            })),
        )
            .into_response()
    }
}
