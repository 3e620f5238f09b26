//! Signer endpoint capability.
//!
//! A signer endpoint is a remote key-holding service. Given a batch of
//! templates and the xpubs it should sign for, it returns one outcome per
//! template, in request order.

use async_trait::async_trait;
use serde::Serialize;

use crate::connection::{ClientResult, Connection};
use crate::signer::types::{EndpointId, SignOutcome, TransactionTemplate};

/// API path of the signing call on a signer service.
pub const SIGN_TRANSACTION_PATH: &str = "/sign-transaction";

/// A remote service able to sign transaction templates.
#[async_trait]
pub trait SignerEndpoint: Send + Sync + std::fmt::Debug {
    /// Registry identity of this endpoint.
    fn id(&self) -> EndpointId;

    /// Sign `transactions` with the keys named by `xpubs`.
    ///
    /// Item-level failures are returned as `SignOutcome::Rejected`; `Err`
    /// means the call as a whole failed.
    async fn sign_transactions(
        &self,
        transactions: &[TransactionTemplate],
        xpubs: &[String],
    ) -> ClientResult<Vec<SignOutcome>>;
}

#[derive(Serialize)]
struct SignRequest<'a> {
    transactions: &'a [TransactionTemplate],
    xpubs: &'a [String],
}

#[async_trait]
impl SignerEndpoint for Connection {
    fn id(&self) -> EndpointId {
        EndpointId::new(self.base_url(), self.token())
    }

    async fn sign_transactions(
        &self,
        transactions: &[TransactionTemplate],
        xpubs: &[String],
    ) -> ClientResult<Vec<SignOutcome>> {
        self.request(SIGN_TRANSACTION_PATH, &SignRequest { transactions, xpubs })
            .await
    }
}
