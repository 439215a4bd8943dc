pub mod query;

use crate::config::ApiConfig;
use crate::internal::models::{ImageHit, SearchResponse};
use query::{QueryDefaults, RequestDescriptor, RequestParams};
use reqwest::Client;
use thiserror::Error;

/// Why a page of results could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never completed (DNS, connect, TLS, timeout, ...)
    #[error("Request failed: {0}")]
    Network(String),
    /// The server answered with a non-2xx status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// 2xx response whose body is not the expected envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.is_timeout() {
            true => Self::Network(format!("timed out: {}", e)),
            false => Self::Network(e.to_string()),
        }
    }
}

/// HTTP client for the image search endpoint.
///
/// Cheap to clone; the feed driver hands a clone to every spawned fetch task.
#[derive(Clone)]
pub struct ApiService {
    client: Client,
    endpoint: String,
    defaults: QueryDefaults,
}

impl ApiService {
    pub fn new(config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(%e, "Failed to build configured HTTP client, using defaults");
                Client::new()
            });

        Self {
            client,
            endpoint: config.endpoint.clone(),
            defaults: config.query_defaults(),
        }
    }

    /// Service pointed at a different endpoint, keeping everything else from `config`.
    pub fn with_endpoint(config: &ApiConfig, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::new(config)
        }
    }

    pub fn request_for(&self, params: &RequestParams) -> RequestDescriptor {
        query::build(&self.endpoint, &self.defaults, Some(params))
    }

    /// Fetch one page of hits for `params`.
    pub async fn fetch_images(&self, params: &RequestParams) -> Result<Vec<ImageHit>, FetchError> {
        let request = self.request_for(params);
        self.fetch(&request).await
    }

    /// Execute a built request and decode the `hits` array.
    pub async fn fetch(&self, request: &RequestDescriptor) -> Result<Vec<ImageHit>, FetchError> {
        let start = std::time::Instant::now();
        let resp = self.client.get(request.url()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %request, "search request rejected");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        let hits = body
            .hits
            .ok_or_else(|| FetchError::MalformedResponse("missing `hits` field".to_string()))?;

        tracing::debug!(
            elapsed = ?start.elapsed(),
            count = hits.len(),
            total_hits = body.total_hits,
            "search.fetch"
        );
        Ok(hits)
    }
}

impl Default for ApiService {
    fn default() -> Self {
        Self::new(&ApiConfig::default())
    }
}
