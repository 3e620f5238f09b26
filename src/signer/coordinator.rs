//! Signing coordinator.
//!
//! Pipes transaction templates through every registered signer endpoint in
//! registration order. Each stage receives the previous stage's output, so
//! stages always run one after another.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::ClientConfig;
use crate::connection::{ClientResult, Connection};
use crate::observability::metrics;
use crate::signer::endpoint::SignerEndpoint;
use crate::signer::registry::{SignerRegistration, SignerRegistry};
use crate::signer::types::{
    BatchSignResponse, KeyIdentifier, SignOutcome, SignerError, SignerResult, TransactionTemplate,
};

/// Coordinates signing across one or more remote signer endpoints.
///
/// Safe to share between tasks; calls in flight keep the registration list
/// they started with.
#[derive(Debug, Default)]
pub struct HsmSigner {
    registry: RwLock<SignerRegistry>,
}

impl HsmSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a coordinator from the `[[signers]]` sections of a config.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let signer = Self::new();
        for entry in &config.signers {
            let connection = Arc::new(Connection::with_config(
                entry.url.clone(),
                entry.token.clone(),
                &config.timeouts,
                &config.retries,
            )?);
            for xpub in &entry.xpubs {
                signer.register_shared(xpub.as_str(), connection.clone());
            }
        }
        Ok(signer)
    }

    /// Register `key` with a signer endpoint.
    pub fn register<E>(&self, key: impl Into<KeyIdentifier>, endpoint: E)
    where
        E: SignerEndpoint + 'static,
    {
        self.register_shared(key, Arc::new(endpoint));
    }

    /// Register `key` with an already shared signer endpoint.
    pub fn register_shared(
        &self,
        key: impl Into<KeyIdentifier>,
        endpoint: Arc<dyn SignerEndpoint>,
    ) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(key.into(), endpoint);
    }

    /// Current registrations, in signing order.
    pub fn registrations(&self) -> Vec<SignerRegistration> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Number of distinct signer endpoints.
    pub fn len(&self) -> usize {
        self.registry.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sign a single template with every registered signer.
    ///
    /// With no signers registered the template is returned unchanged.
    pub async fn sign(&self, template: TransactionTemplate) -> SignerResult<TransactionTemplate> {
        let registrations = self.registrations();
        let mut current = template;

        for (stage, registration) in registrations.iter().enumerate() {
            tracing::debug!(endpoint = %registration.id, stage, xpubs = registration.xpubs.len(), "Signing template");

            let outcomes = registration
                .endpoint
                .sign_transactions(std::slice::from_ref(&current), &registration.xpubs)
                .await
                .map_err(|source| {
                    metrics::record_sign_stage("transport_error");
                    SignerError::Transport {
                        endpoint: registration.id.clone(),
                        source,
                    }
                })?;

            if outcomes.len() > 1 {
                tracing::warn!(endpoint = %registration.id, items = outcomes.len(), "Signer returned extra items; using the first");
            }

            current = match outcomes.into_iter().next() {
                Some(SignOutcome::Signed(template)) => {
                    metrics::record_sign_stage("signed");
                    template
                }
                Some(SignOutcome::Rejected(error)) => {
                    metrics::record_sign_stage("rejected");
                    return Err(SignerError::Rejected {
                        endpoint: registration.id.clone(),
                        error,
                    });
                }
                None => {
                    metrics::record_sign_stage("malformed");
                    return Err(SignerError::MalformedResponse {
                        endpoint: registration.id.clone(),
                        reason: "empty response to a single-template request".to_string(),
                    });
                }
            };
        }

        Ok(current)
    }

    /// Sign a batch of templates with every registered signer.
    ///
    /// `None` entries are dropped before anything is sent, so positions in
    /// the result refer to the remaining templates only. Items rejected by
    /// one signer keep their error and are not sent to later signers.
    pub async fn sign_batch<I>(&self, templates: I) -> SignerResult<BatchSignResponse>
    where
        I: IntoIterator<Item = Option<TransactionTemplate>>,
    {
        let mut dropped = 0usize;
        let mut response: Vec<SignOutcome> = Vec::new();
        for template in templates {
            match template {
                Some(t) => response.push(SignOutcome::Signed(t)),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped empty batch entries before signing");
        }

        let registrations = self.registrations();

        for (stage, registration) in registrations.iter().enumerate() {
            let (positions, batch): (Vec<usize>, Vec<TransactionTemplate>) = response
                .iter()
                .enumerate()
                .filter_map(|(i, outcome)| outcome.as_signed().map(|t| (i, t.clone())))
                .unzip();

            if batch.is_empty() {
                tracing::debug!(endpoint = %registration.id, stage, "Nothing left to sign; skipping signer");
                continue;
            }

            tracing::debug!(endpoint = %registration.id, stage, items = batch.len(), "Signing batch");

            let outcomes = registration
                .endpoint
                .sign_transactions(&batch, &registration.xpubs)
                .await
                .map_err(|source| {
                    metrics::record_sign_stage("transport_error");
                    SignerError::Transport {
                        endpoint: registration.id.clone(),
                        source,
                    }
                })?;

            if outcomes.len() != batch.len() {
                metrics::record_sign_stage("malformed");
                return Err(SignerError::MalformedResponse {
                    endpoint: registration.id.clone(),
                    reason: format!("expected {} items, got {}", batch.len(), outcomes.len()),
                });
            }
            metrics::record_sign_stage(batch_stage_outcome(&outcomes));

            for (position, outcome) in positions.into_iter().zip(outcomes) {
                if let SignOutcome::Rejected(error) = &outcome {
                    tracing::debug!(endpoint = %registration.id, position, code = %error.code, "Signer rejected batch item");
                }
                response[position] = outcome;
            }
        }

        let result = BatchSignResponse::from_response(response);
        metrics::record_batch_items(result.successes.len(), result.errors.len());
        Ok(result)
    }
}

// Metrics label for a batch stage that returned one outcome per item.
fn batch_stage_outcome(outcomes: &[SignOutcome]) -> &'static str {
    let rejected = outcomes.iter().filter(|o| o.is_rejected()).count();
    if rejected == 0 {
        "signed"
    } else if rejected == outcomes.len() {
        "rejected"
    } else {
        "partial"
    }
}
