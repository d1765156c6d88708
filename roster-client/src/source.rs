//! Upstream member source
//!
//! [`MemberSource`] is the seam between the fetch pipeline and the network.
//! [`HttpMemberSource`] talks to the forwarding server; tests substitute
//! scripted sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use roster_common::config::ClientConfig;
use roster_common::query::{FilterBody, FilteredTableResponse, PageRequest};
use roster_common::{Error, Result};
use serde_json::Value;
use tracing::debug;

/// Paginated member query endpoint
#[async_trait]
pub trait MemberSource: Send + Sync {
    /// Fetch one page of raw member records in backend order
    ///
    /// # Errors
    /// Transport, status and body-parse failures; an empty page is not an error.
    async fn fetch_page(&self, page: PageRequest, filters: &FilterBody) -> Result<Vec<Value>>;
}

/// HTTP client for the forwarding server
pub struct HttpMemberSource {
    http_client: Client,
    base_url: String,
}

impl HttpMemberSource {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:3000`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for `api_base_url` with the configured timeout
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Country codes present in the roster (may contain nulls)
    pub async fn fetch_countries(&self) -> Result<Vec<Option<String>>> {
        let url = format!("{}/countries", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Country request failed: {}", e)))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("Failed to parse country list: {}", e)))
    }
}

#[async_trait]
impl MemberSource for HttpMemberSource {
    async fn fetch_page(&self, page: PageRequest, filters: &FilterBody) -> Result<Vec<Value>> {
        debug!(offset = page.offset, limit = page.limit, "Requesting member page");

        let url = format!("{}/members", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[("offset", page.offset), ("limit", page.limit)])
            .json(filters)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Member request failed: {}", e)))?;

        let response = check_status(response).await?;
        let table: FilteredTableResponse = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("Failed to parse member page: {}", e)))?;

        debug!(rows = table.response.len(), "Member page received");
        Ok(table.response)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Upstream {
        status: status.as_u16(),
        body,
    })
}
