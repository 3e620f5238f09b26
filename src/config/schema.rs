//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the ledger access token.
pub const ACCESS_TOKEN_ENV_VAR: &str = "LEDGER_ACCESS_TOKEN";

/// Root configuration for the ledger client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Ledger core connection.
    pub core: CoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Signer endpoints, in signing order.
    pub signers: Vec<SignerConfig>,
}

/// Ledger core connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Base URL of the ledger core (e.g., "http://localhost:1999").
    pub url: String,

    /// Access token in `user:secret` form.
    pub token: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:1999".to_string(),
            token: None,
        }
    }
}

impl CoreConfig {
    /// Token from `LEDGER_ACCESS_TOKEN` if set, else the one from the file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(ACCESS_TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }
}

/// A remote signer (HSM) endpoint and the keys it signs with.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerConfig {
    /// Base URL of the signer (e.g., "http://localhost:1999/mockhsm").
    pub url: String,

    /// Optional access token for the signer.
    #[serde(default)]
    pub token: Option<String>,

    /// Extended public keys this signer should sign for.
    #[serde(default)]
    pub xpubs: Vec<String>,
}

/// Timeout configuration for HTTP calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
