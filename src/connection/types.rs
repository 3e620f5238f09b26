//! Transport error definitions and the ledger's error body.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error object reported by the ledger or a signer service.
///
/// Appears either as the body of a non-2xx response or as an element of a
/// batch response, in place of the item that could not be processed.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Service error code (e.g., "CH735").
    #[serde(deserialize_with = "code_from_any")]
    pub code: String,

    /// Human-readable summary.
    #[serde(default)]
    pub message: String,

    /// Additional detail about this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Whether the same request may succeed if repeated.
    #[serde(default)]
    pub temporary: bool,

    /// Structured error data, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
            temporary: false,
            data: None,
        }
    }
}

// Some services send numeric codes.
fn code_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "error code must be a string or number, got {}",
            other
        ))),
    }
}

/// Errors that can occur while talking to the ledger or a signer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Request did not complete within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection or protocol failure.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx response without a recognizable error body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Non-2xx response carrying a ledger error object.
    #[error("HTTP {status}: {error}")]
    Api { status: u16, error: ApiError },

    /// Response body was not the expected JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for transport operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_from_wire() {
        let error: ApiError = serde_json::from_value(json!({
            "code": "CH735",
            "message": "Transaction rejected",
            "detail": "missing signature",
            "temporary": false,
        }))
        .unwrap();

        assert_eq!(error.code, "CH735");
        assert_eq!(error.detail.as_deref(), Some("missing signature"));
        assert_eq!(error.to_string(), "CH735: Transaction rejected");
    }

    #[test]
    fn test_numeric_code() {
        let error: ApiError = serde_json::from_value(json!({ "code": 42 })).unwrap();
        assert_eq!(error.code, "42");
        assert!(error.message.is_empty());
        assert!(!error.temporary);
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Status { status: 502, body: "bad gateway".into() };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");

        let err = ClientError::Api { status: 400, error: ApiError::new("CH002", "bad request") };
        assert_eq!(err.to_string(), "HTTP 400: CH002: bad request");
    }
}
