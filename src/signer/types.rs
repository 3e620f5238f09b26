//! Signing types and error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::connection::{ApiError, ClientError};

/// A partially built or partially signed transaction.
///
/// Opaque to the client: signers fill in signatures, everything else is
/// passed along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionTemplate(Value);

impl TransactionTemplate {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for TransactionTemplate {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Result of one item in a signing response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SignOutcome {
    /// The (possibly further) signed template.
    Signed(TransactionTemplate),
    /// The signer reported an error for this item.
    Rejected(ApiError),
}

impl SignOutcome {
    pub fn as_signed(&self) -> Option<&TransactionTemplate> {
        match self {
            SignOutcome::Signed(t) => Some(t),
            SignOutcome::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SignOutcome::Rejected(_))
    }
}

impl<'de> Deserialize<'de> for SignOutcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if has_error_code(&value) {
            Ok(SignOutcome::Rejected(item_error(value)))
        } else {
            Ok(SignOutcome::Signed(TransactionTemplate(value)))
        }
    }
}

// An item is an error iff its `code` is set to something other than
// null, false, 0 or "".
fn has_error_code(value: &Value) -> bool {
    match value.get("code") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

// Never fails. Items that do not fit `ApiError` keep their raw object in `data`.
fn item_error(value: Value) -> ApiError {
    if let Ok(error) = ApiError::deserialize(&value) {
        return error;
    }

    let code = match value.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);

    ApiError {
        code,
        message: text("message").unwrap_or_default(),
        detail: text("detail"),
        temporary: value.get("temporary").and_then(Value::as_bool).unwrap_or(false),
        data: Some(value),
    }
}

/// Classified outcome of a batch signing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSignResponse {
    /// Items every signer accepted, in response order.
    pub successes: Vec<TransactionTemplate>,
    /// Items some signer rejected, in response order.
    pub errors: Vec<ApiError>,
    /// The full final response, one entry per submitted template.
    pub response: Vec<SignOutcome>,
}

impl BatchSignResponse {
    /// Split a final-stage response into successes and errors.
    pub fn from_response(response: Vec<SignOutcome>) -> Self {
        let mut successes = Vec::new();
        let mut errors = Vec::new();
        for outcome in &response {
            match outcome {
                SignOutcome::Signed(t) => successes.push(t.clone()),
                SignOutcome::Rejected(e) => errors.push(e.clone()),
            }
        }
        Self {
            successes,
            errors,
            response,
        }
    }
}

/// Key record as returned by key services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpubKey {
    pub xpub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// A key to register with a signer: a bare xpub or a key record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyIdentifier {
    Xpub(String),
    Key(XpubKey),
}

impl KeyIdentifier {
    pub fn into_xpub(self) -> String {
        match self {
            KeyIdentifier::Xpub(xpub) => xpub,
            KeyIdentifier::Key(key) => key.xpub,
        }
    }
}

impl From<&str> for KeyIdentifier {
    fn from(xpub: &str) -> Self {
        KeyIdentifier::Xpub(xpub.to_string())
    }
}

impl From<String> for KeyIdentifier {
    fn from(xpub: String) -> Self {
        KeyIdentifier::Xpub(xpub)
    }
}

impl From<XpubKey> for KeyIdentifier {
    fn from(key: XpubKey) -> Self {
        KeyIdentifier::Key(key)
    }
}

impl From<&XpubKey> for KeyIdentifier {
    fn from(key: &XpubKey) -> Self {
        KeyIdentifier::Key(key.clone())
    }
}

/// Identity of a signer endpoint: `<base_url>-<token>` or `<base_url>-noauth`.
///
/// Display and Debug output show only the URL so tokens stay out of logs.
/// Equality and hashing use the identity string alone.
#[derive(Clone)]
pub struct EndpointId {
    id: String,
    url_len: usize,
}

impl EndpointId {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            id: format!("{}-{}", base_url, token.unwrap_or("noauth")),
            url_len: base_url.len(),
        }
    }

    /// The full identity string, token included.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.id[..self.url_len]
    }

    pub fn is_authenticated(&self) -> bool {
        &self.id[self.url_len..] != "-noauth"
    }
}

impl PartialEq for EndpointId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EndpointId {}

impl Hash for EndpointId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = if self.is_authenticated() { "token" } else { "noauth" };
        write!(f, "{} ({})", self.url(), auth)
    }
}

impl fmt::Debug for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EndpointId").field(&self.to_string()).finish()
    }
}

/// Errors that abort a signing call.
#[derive(Debug, Error)]
pub enum SignerError {
    /// A signer could not be reached or answered with a failure.
    #[error("Signer {endpoint} failed: {source}")]
    Transport {
        endpoint: EndpointId,
        #[source]
        source: ClientError,
    },

    /// A signer answered with a response that cannot be matched to the request.
    #[error("Malformed response from signer {endpoint}: {reason}")]
    MalformedResponse { endpoint: EndpointId, reason: String },

    /// A signer rejected the only template of a single signing call.
    #[error("Signer {endpoint} rejected the transaction: {error}")]
    Rejected { endpoint: EndpointId, error: ApiError },
}

/// Result type for signing operations.
pub type SignerResult<T> = Result<T, SignerError>;
