// Save endpoint HTTP client
//
// Wraps `reqwest::Client` with the endpoint URL and response mapping.
// One request persists one key; batching and ordering are the caller's job.

use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ErrorBody, SaveRequest};
use crate::transport::TransportConfig;

const BODY_PREVIEW_LEN: usize = 200;

/// HTTP client for the source-save endpoint.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so one
/// client can be shared by every endpoint-backed entity.
#[derive(Debug, Clone)]
pub struct SaveClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl SaveClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `endpoint` is the full URL requests are posted to
    /// (e.g. `http://localhost:5173/__tangent/save`).
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Parse `endpoint` and build a client with default transport settings.
    pub fn from_endpoint(endpoint: &str) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        Self::new(endpoint, &TransportConfig::default())
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            timeout_secs: 0,
        }
    }

    /// The URL save requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Persist one key. Any 2xx response is success; the body is ignored.
    pub async fn save(&self, request: &SaveRequest) -> Result<(), Error> {
        debug!(
            id = %request.id,
            key = %request.key,
            file = %request.file_path,
            "POST {}",
            self.endpoint
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        self.check_status(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map a non-2xx response into `Error::Rejected`, preferring the
    /// `{ "message": ... }` payload over a raw body preview.
    async fn check_status(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            trace!(%status, "save accepted");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(payload) => payload.message,
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned(),
            Err(_) => body.chars().take(BODY_PREVIEW_LEN).collect(),
        };

        Err(Error::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}
