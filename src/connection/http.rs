//! HTTP connection to a ledger core or signer service.
//!
//! # Responsibilities
//! - Join base URL and API path
//! - Attach credentials, request ID and JSON headers
//! - Enforce timeouts and retry retryable failures
//! - Map responses into typed results or `ClientError`

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::config::{RetryConfig, TimeoutConfig};
use crate::connection::request::{RequestId, X_REQUEST_ID};
use crate::connection::types::{ApiError, ClientError, ClientResult};
use crate::observability::metrics;
use crate::resilience::backoff::retry_delay;
use crate::resilience::retries::{is_retryable, max_attempts};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("ledger-client-rust/", env!("CARGO_PKG_VERSION"));

/// A connection to one remote service, bound to a base URL and token.
#[derive(Clone)]
pub struct Connection {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
    retries: RetryConfig,
}

impl Connection {
    /// Create a connection with default timeouts and retries disabled.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> ClientResult<Self> {
        Self::with_config(base_url, token, &TimeoutConfig::default(), &RetryConfig::default())
    }

    /// Create a connection with explicit timeout and retry settings.
    pub fn with_config(
        base_url: impl Into<String>,
        token: Option<String>,
        timeouts: &TimeoutConfig,
        retries: &RetryConfig,
    ) -> ClientResult<Self> {
        let base_url = base_url.into();
        let parsed = url::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidUrl {
                url: base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            base_url,
            token: token.filter(|t| !t.is_empty()),
            http,
            retries: retries.clone(),
        })
    }

    /// Base URL exactly as given at construction.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Full URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    pub async fn request<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url_for(path);
        let request_id = RequestId::new();
        let max_attempts = max_attempts(&self.retries);
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.send_once(path, &url, &request_id, body).await {
                Ok(value) => return Ok(value),
                Err(e) if attempts < max_attempts && is_retryable(&e) => {
                    let backoff = retry_delay(&self.retries, attempts);
                    tracing::info!(
                        request_id = %request_id,
                        attempt = attempts,
                        delay = ?backoff,
                        error = %e,
                        "Retrying request"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    tracing::debug!(request_id = %request_id, url = %url, attempt = attempts, error = %e, "Request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn send_once<B, R>(
        &self,
        path: &str,
        url: &str,
        request_id: &RequestId,
        body: &B,
    ) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let start_time = Instant::now();

        let mut builder = self
            .http
            .post(url)
            .header(X_REQUEST_ID, request_id.as_str())
            .json(body);
        if let Some(token) = &self.token {
            builder = match token.split_once(':') {
                Some((user, secret)) => builder.basic_auth(user, Some(secret)),
                None => builder.basic_auth(token, None::<&str>),
            };
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                metrics::record_request(path, None, start_time);
                return Err(self.map_transport(url, e));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(url, e))?;
        metrics::record_request(path, Some(status.as_u16()), start_time);

        tracing::debug!(
            request_id = %request_id,
            url = %url,
            status = status.as_u16(),
            "Response received"
        );

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiError>(&text) {
                Ok(error) if !error.code.is_empty() => ClientError::Api {
                    status: status.as_u16(),
                    error,
                },
                _ => ClientError::Status {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn map_transport(&self, url: &str, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout { url: url.to_string() }
        } else {
            ClientError::Transport(e)
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .field("max_attempts", &max_attempts(&self.retries))
            .finish()
    }
}
