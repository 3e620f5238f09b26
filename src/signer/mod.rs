//! Transaction signing subsystem.
//!
//! # Data Flow
//! ```text
//! register(xpub, endpoint)
//!     → registry.rs (one entry per endpoint identity, xpubs accumulated)
//!
//! sign / sign_batch(templates)
//!     → coordinator.rs (snapshot registrations)
//!     → endpoint.rs (POST /sign-transaction, one signer at a time)
//!     → types.rs (SignOutcome per item, BatchSignResponse)
//! ```
//!
//! # Design Decisions
//! - Signers run strictly in registration order; each sees the previous output
//! - A failed call aborts the chain; rejected batch items are data
//! - Rejected items are not re-sent to later signers
//! - Empty batch entries are dropped before signing, shifting positions

pub mod coordinator;
pub mod endpoint;
pub mod registry;
pub mod types;

pub use coordinator::HsmSigner;
pub use endpoint::{SignerEndpoint, SIGN_TRANSACTION_PATH};
pub use registry::{SignerRegistration, SignerRegistry};
pub use types::{
    BatchSignResponse, EndpointId, KeyIdentifier, SignOutcome, SignerError, SignerResult,
    TransactionTemplate, XpubKey,
};
