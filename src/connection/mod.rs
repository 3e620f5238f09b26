//! Connection subsystem.
//!
//! # Data Flow
//! ```text
//! Client / HsmSigner
//!     → http.rs (Connection: URL join, auth, JSON body)
//!     → request.rs (X-Request-ID per logical request)
//!     → resilience (retry with backoff on retryable failures)
//!     → types.rs (ClientError / ApiError on failure)
//! ```
//!
//! # Design Decisions
//! - One `Connection` per remote service; cheap to clone (shared reqwest pool)
//! - Tokens are sent as HTTP basic auth and never logged
//! - Non-2xx bodies are decoded as ledger errors when they carry a code

pub mod http;
pub mod request;
pub mod types;

pub use http::Connection;
pub use request::{RequestId, X_REQUEST_ID};
pub use types::{ApiError, ClientError, ClientResult};
