//! Client side of ConLearn.
//!
//! Wraps the files API in [`ApiClient`], signs users in through an
//! [`identity::IdentityProvider`], drives the presign, PUT and complete
//! handshake in [`orchestrator::UploadOrchestrator`] and turns listed uploads
//! into display cards with [`gallery::render_gallery`].

pub mod api;
pub mod gallery;
pub mod identity;
pub mod models;
pub mod orchestrator;
pub mod uploader;

pub use models::UploadSummary;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx answer; `message` is the server's `error` field when it sent one
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the ConLearn files API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: CONLEARN_API_URL, falling back to the local server.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url =
            std::env::var("CONLEARN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// GET and deserialize a JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.build_url(path)).send().await?;
        read_json(response).await
    }

    /// POST a JSON body and deserialize the response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Deserialize a successful response, or turn an error status into
/// [`ClientError::Http`] carrying the server's message.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
