//! Signer registry.
//!
//! # Responsibilities
//! - Keep one registration per endpoint identity
//! - Accumulate xpubs per endpoint in registration order
//! - Hand out stable snapshots for signing calls

use indexmap::IndexMap;
use std::sync::Arc;

use crate::signer::endpoint::SignerEndpoint;
use crate::signer::types::{EndpointId, KeyIdentifier};

/// One signer endpoint and the keys it signs with.
#[derive(Debug, Clone)]
pub struct SignerRegistration {
    pub id: EndpointId,
    pub endpoint: Arc<dyn SignerEndpoint>,
    pub xpubs: Vec<String>,
}

/// Insertion-ordered map of endpoint identity -> registration.
#[derive(Debug, Default)]
pub struct SignerRegistry {
    registrations: IndexMap<EndpointId, SignerRegistration>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` to the registration for `endpoint`, creating it if needed.
    ///
    /// The first endpoint handle registered for an identity is kept; later
    /// handles with the same identity only contribute their key.
    pub fn register(&mut self, key: KeyIdentifier, endpoint: Arc<dyn SignerEndpoint>) {
        let id = endpoint.id();
        let registration = self
            .registrations
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::debug!(endpoint = %id, "Signer endpoint registered");
                SignerRegistration {
                    id,
                    endpoint,
                    xpubs: Vec::new(),
                }
            });

        registration.xpubs.push(key.into_xpub());
    }

    /// Copy of all registrations, in insertion order.
    pub fn snapshot(&self) -> Vec<SignerRegistration> {
        self.registrations.values().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: &EndpointId) -> Option<&SignerRegistration> {
        self.registrations.get(id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;

    fn connection(url: &str, token: Option<&str>) -> Arc<dyn SignerEndpoint> {
        Arc::new(Connection::new(url, token.map(String::from)).unwrap())
    }

    #[test]
    fn test_same_identity_accumulates_keys() {
        let mut registry = SignerRegistry::new();
        registry.register("xpub1".into(), connection("http://hsm-a:1999", None));
        registry.register("xpub2".into(), connection("http://hsm-a:1999", None));

        assert_eq!(registry.len(), 1);
        let id = EndpointId::new("http://hsm-a:1999", None);
        assert_eq!(registry.get(&id).unwrap().xpubs, vec!["xpub1", "xpub2"]);
    }

    #[test]
    fn test_token_distinguishes_identity() {
        let mut registry = SignerRegistry::new();
        registry.register("xpub1".into(), connection("http://hsm-a:1999", None));
        registry.register("xpub2".into(), connection("http://hsm-a:1999", Some("c:s")));

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_keeps_insertion_order() {
        let mut registry = SignerRegistry::new();
        registry.register("xb".into(), connection("http://hsm-b:1999", None));
        registry.register("xa".into(), connection("http://hsm-a:1999", None));
        registry.register("xb2".into(), connection("http://hsm-b:1999", None));

        let snapshot = registry.snapshot();
        let urls: Vec<&str> = snapshot.iter().map(|r| r.id.url()).collect();
        assert_eq!(urls, vec!["http://hsm-b:1999", "http://hsm-a:1999"]);
        assert_eq!(snapshot[0].xpubs, vec!["xb", "xb2"]);

        // Later registrations do not change an existing snapshot.
        registry.register("xc".into(), connection("http://hsm-c:1999", None));
        assert_eq!(snapshot.len(), 2);
    }
}
