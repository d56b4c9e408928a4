//! lumen-client: HTTP client for the lumen image processing backend.
//!
//! The backend is stateless per request: every render carries the
//! source image and the complete edit document. This crate only moves
//! bytes; deciding which responses to keep is
//! [`SyncDriver`](lumen_edits::SyncDriver)'s job.
//!
//! Builds for native targets (the CLI, tests) and for
//! `wasm32-unknown-unknown` (the web app), where reqwest delegates to
//! the browser's `fetch`.

use lumen_edits::{EditDocument, EncodedImage, HistogramData, RenderRequest};
use serde::{Deserialize, Serialize};

/// Backend address used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Longest error body carried in [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
}

impl BackendConfig {
    /// Configuration for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// Errors from a backend call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The response body could not be understood.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

#[derive(Serialize)]
struct RenderBody<'a> {
    image: &'a EncodedImage,
    edits: &'a EditDocument,
}

#[derive(Serialize)]
struct HistogramBody<'a> {
    image: &'a EncodedImage,
}

/// The render endpoint answers with a data URL or a bare base64 payload.
#[derive(Deserialize)]
struct RenderReply {
    image: String,
}

/// Client for the render and histogram endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    /// A client with a default HTTP stack.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    /// A client sharing an existing HTTP stack.
    #[must_use]
    pub const fn with_http(http: reqwest::Client, config: BackendConfig) -> Self {
        Self { http, config }
    }

    /// The configuration this client talks to.
    #[must_use]
    pub const fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Render the request's source image with its edit document.
    ///
    /// A bare base64 reply is labelled with the source image's MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success
    /// status, or a reply that is not an image.
    pub async fn render(&self, request: &RenderRequest) -> Result<EncodedImage, ClientError> {
        let body = RenderBody {
            image: &request.image,
            edits: &request.edits,
        };
        let bytes = self.post_json("render", &body).await?;
        let reply: RenderReply = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Malformed(format!("render reply: {e}")))?;
        let image = EncodedImage::from_backend(&reply.image, request.image.mime())
            .map_err(|e| ClientError::Malformed(format!("render reply: {e}")))?;
        tracing::debug!(ticket = %request.ticket, %image, "render reply received");
        Ok(image)
    }

    /// Compute the histogram of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success
    /// status, or a reply that is not a 256-bucket histogram.
    pub async fn histogram(&self, image: &EncodedImage) -> Result<HistogramData, ClientError> {
        let bytes = self.post_json("histogram", &HistogramBody { image }).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Malformed(format!("histogram reply: {e}")))
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.config.endpoint(path);
        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "backend request failed");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
                body.truncate(cut);
            }
            tracing::warn!(%url, status = status.as_u16(), "backend rejected request");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
