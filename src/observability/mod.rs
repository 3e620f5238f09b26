//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Connection and HsmSigner produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID on every transport log line
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
