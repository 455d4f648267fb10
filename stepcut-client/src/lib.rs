//! Stepcut HTTP Client
//!
//! A typed HTTP client for the STEP-to-DXF conversion and quoting service,
//! plus the job status poller that follows a job until it finishes.
//!
//! # Example
//!
//! ```no_run
//! use stepcut_client::ServiceClient;
//! use stepcut_core::dto::job::CreateJob;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ServiceClient::new("http://localhost:8787");
//!
//!     let created = client.create_job(&CreateJob::default()).await?;
//!     client.upload_step(&created.id, "bracket.step").await?;
//!     client.request_quote(&created.id).await?;
//!
//!     let job = client.get_job(&created.id).await?;
//!     println!("{} is {}", job.id, job.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
pub mod poller;
mod vendors;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use poller::{DEFAULT_POLL_INTERVAL, JobPoller, JobSource, PollOutcome, PollStopper};
pub use stepcut_core::dto::payload::Payload;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the conversion service API
///
/// Every operation is a one-shot call: failures are returned to the caller
/// as-is and nothing is retried.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Base URL of the service (e.g., "http://localhost:8787")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ServiceClient {
    /// Create a new service client
    ///
    /// # Example
    /// ```
    /// use stepcut_client::ServiceClient;
    ///
    /// let client = ServiceClient::new("http://localhost:8787");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new service client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use stepcut_client::ServiceClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ServiceClient::with_client("http://localhost:8787", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an endpoint URL from path segments
    ///
    /// Each segment is percent-encoded on its own, so opaque ids can never
    /// escape their position in the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL `{}`: {}", self.base_url, e))
        })?;

        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::InvalidRequest(format!(
                    "base URL `{}` cannot carry a path",
                    self.base_url
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }

        Ok(url)
    }

    /// URL of a job resource, `/v1/jobs/{id}` followed by `rest`
    fn job_url(&self, job_id: &str, rest: &[&str]) -> Result<Url> {
        if job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id cannot be empty".to_string(),
            ));
        }

        let mut segments = vec!["v1", "jobs", job_id];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx statuses become [`ClientError::ApiError`] with the raw body.
    /// A body that does not deserialize becomes [`ClientError::ParseError`]
    /// carrying the raw text.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let text = Self::checked_text(response).await?;

        serde_json::from_str(&text).map_err(|e| {
            ClientError::ParseError(format!("{} (body: {})", e, truncate(&text, 512)))
        })
    }

    /// Handle an acknowledgement response, keeping whatever body came back
    async fn handle_payload(&self, response: reqwest::Response) -> Result<Payload> {
        let text = Self::checked_text(response).await?;
        Ok(Payload::from_text(text))
    }

    /// Handle a document download (SVG, DXF)
    async fn handle_bytes(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let bytes = response.bytes().await?;
        debug!("Received {} byte document", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn checked_text(response: reqwest::Response) -> Result<String> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.text().await?)
    }

    async fn status_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        debug!("Service returned {}: {}", status, error_text);
        ClientError::api_error(status.as_u16(), error_text)
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
