//! Root client object.
//!
//! Holds the connection to the ledger core plus the signer connection of
//! the core's bundled mock HSM. Resource-specific calls go through
//! [`Client::request`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, RetryConfig, TimeoutConfig};
use crate::connection::{ClientResult, Connection};

/// Default ledger core URL.
pub const DEFAULT_CORE_URL: &str = "http://localhost:1999";

/// Path of the mock HSM under the core URL.
pub const MOCK_HSM_PATH: &str = "/mockhsm";

/// Client for one ledger core.
#[derive(Debug, Clone)]
pub struct Client {
    connection: Connection,
    mock_hsm_signer: Connection,
}

impl Client {
    /// Create a client for `base_url` with default timeouts.
    ///
    /// The mock HSM signer connection always targets the local default
    /// core, unauthenticated.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> ClientResult<Self> {
        Ok(Self {
            connection: Connection::new(base_url, token)?,
            mock_hsm_signer: Connection::new(format!("{}{}", DEFAULT_CORE_URL, MOCK_HSM_PATH), None)?,
        })
    }

    /// Create a client from a loaded configuration.
    ///
    /// The mock HSM signer connection is placed under the configured core
    /// URL and shares its token.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let token = config.core.resolved_token();
        let mock_hsm_url = format!("{}{}", config.core.url.trim_end_matches('/'), MOCK_HSM_PATH);

        Ok(Self {
            connection: Self::connect(&config.core.url, token.clone(), &config.timeouts, &config.retries)?,
            mock_hsm_signer: Self::connect(&mock_hsm_url, token, &config.timeouts, &config.retries)?,
        })
    }

    fn connect(
        url: &str,
        token: Option<String>,
        timeouts: &TimeoutConfig,
        retries: &RetryConfig,
    ) -> ClientResult<Connection> {
        Connection::with_config(url, token, timeouts, retries)
    }

    /// Submit a request to the ledger core.
    pub async fn request<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.connection.request(path, body).await
    }

    /// Connection to the ledger core.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Signer connection of the core's mock HSM, for use with `HsmSigner`.
    pub fn mock_hsm_signer_connection(&self) -> &Connection {
        &self.mock_hsm_signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = Client::new("https://ledger.example.com", Some("c:s".into())).unwrap();
        assert_eq!(client.connection().base_url(), "https://ledger.example.com");
        assert_eq!(client.connection().token(), Some("c:s"));
        assert_eq!(
            client.mock_hsm_signer_connection().base_url(),
            "http://localhost:1999/mockhsm"
        );
        assert!(client.mock_hsm_signer_connection().token().is_none());
    }

    #[test]
    fn test_from_config_places_mock_hsm_under_core() {
        let mut config = ClientConfig::default();
        config.core.url = "http://ledger:1999/".into();

        let client = Client::from_config(&config).unwrap();
        assert_eq!(
            client.mock_hsm_signer_connection().base_url(),
            "http://ledger:1999/mockhsm"
        );
    }

    #[test]
    fn test_invalid_core_url() {
        assert!(Client::new("not-a-url", None).is_err());
    }
}
