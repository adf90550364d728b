//! HTTP client for the Licenca API.
//!
//! Provides a minimal bearer-authenticated client with generic JSON helpers,
//! domain methods for processes and files, and the [`UploadOrchestrator`]
//! that drives a file from local validation to recorded metadata.
//! The CLI uses this client directly.

pub mod api;
pub mod error;
pub mod orchestrator;
pub mod phase;
pub mod progress;

use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub use error::{ApiError, UploadError};
pub use orchestrator::{CandidateFile, DeleteOutcome, OwnerRef, UploadOrchestrator, UploadedFile};
pub use phase::{UploadPhase, UploadTracker};

/// Versioned path prefix of every JSON route
pub const API_PREFIX: &str = "/api/v0";

/// Total time allowed for one API call
pub const API_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the Licenca API, authenticated with a bearer token.
///
/// Only API calls are bounded by [`API_TIMEOUT`]. Requests built on
/// [`ApiClient::http`] carry just the connect timeout, so a large object
/// transfer over a slow link is never cut off by the client.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
    api_timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            api_timeout: API_TIMEOUT,
        })
    }

    /// Override the per-call timeout of API requests.
    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    /// Create client from environment: LICENCA_API_URL (default
    /// http://localhost:3000) and LICENCA_TOKEN.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("LICENCA_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let token = std::env::var("LICENCA_TOKEN")
            .context("Missing token. Set LICENCA_TOKEN to a bearer token")?;
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.build_url(path))
            .timeout(self.api_timeout)
            .bearer_auth(&self.token)
    }

    /// Raw client for requests outside the API, such as signed object URLs.
    /// No total-request timeout applies.
    pub fn http(&self) -> &Client {
        &self.client
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.request(Method::GET, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        Self::json(Self::send(request).await?).await
    }

    /// Send a JSON body with `method` and deserialize the JSON response.
    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(method, path).json(body);
        Self::json(Self::send(request).await?).await
    }

    /// Send a request whose response body is ignored.
    pub async fn send_empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut request = self.request(method, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::send(request).await.map(drop)
    }
}

// Re-export domain types for convenience.
pub use licenca_core::models::{
    DownloadUrlResponse, FileMetadata, LicenseProcess, ProcessCollaborator, ProcessDocument,
    ProcessStats, ProcessWithCompany, StoredFileMetadata, WriteCredential,
};
