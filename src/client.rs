//! HTTP client for a running EHB Roadmap server.
//!
//! Used by `ehbr search --remote`. The base URL comes from
//! [`Config::server_url`](crate::config::Config) and includes `/api/v1`.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::*;
use crate::search::{SearchFilters, SearchResult};

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client for the roadmap API.
#[derive(Debug, Clone)]
pub struct RoadmapClient {
    base_url: String,
    client: Client,
}

impl RoadmapClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        self.handle_response(response).await
    }

    /// Run a search on the server.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let response = self
            .client
            .get(self.url("/search"))
            .query(&search_params(query, filters))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_module(&self, id: &str) -> Result<Module, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/modules/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }
}

/// Query-string pairs for `GET /search`.
fn search_params(query: &str, filters: &SearchFilters) -> Vec<(&'static str, String)> {
    let mut params = vec![("q", query.to_string())];
    if let Some(status) = filters.status {
        params.push(("status", status.as_str().to_string()));
    }
    if let Some(priority) = filters.priority {
        params.push(("priority", priority.as_str().to_string()));
    }
    if !filters.tags.is_empty() {
        let tags: Vec<&str> = filters.tags.iter().map(String::as_str).collect();
        params.push(("tags", tags.join(",")));
    }
    if let Some(range) = filters.date_range {
        params.push(("start", range.start.to_string()));
        params.push(("end", range.end.to_string()));
    }
    params
}
