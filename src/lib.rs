//! Rust client for a ledger core and its HSM signers.

pub mod client;
pub mod config;
pub mod connection;
pub mod observability;
pub mod resilience;
pub mod signer;

pub use client::Client;
pub use config::schema::ClientConfig;
pub use connection::{ApiError, ClientError, Connection};
pub use signer::{BatchSignResponse, HsmSigner, SignOutcome, SignerError, TransactionTemplate};
