//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to ledger or signer:
//!     → reqwest client enforces connect/request timeouts
//!     → On failure: retries.rs (check if retryable, retry with backoff)
//!     → backoff.rs (exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries live in the transport only; the signing pipeline never retries
//! - Retries are opt-in since signing requests are POSTs

pub mod backoff;
pub mod retries;
