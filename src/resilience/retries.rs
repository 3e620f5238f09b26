//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed call is worth repeating
//! - Bound the number of attempts made for one request
//!
//! # Design Decisions
//! - Connection errors and timeouts always retryable
//! - 502/503/504 retryable; other statuses are final
//! - Ledger errors retryable only when flagged `temporary`

use crate::config::RetryConfig;
use crate::connection::ClientError;

/// Check if a failed request can be retried.
pub fn is_retryable(error: &ClientError) -> bool {
    match error {
        ClientError::Timeout { .. } => true,
        ClientError::Transport(e) => e.is_connect() || e.is_timeout(),
        ClientError::Status { status, .. } => matches!(status, 502..=504),
        ClientError::Api { error, .. } => error.temporary,
        ClientError::InvalidUrl { .. } | ClientError::Decode(_) => false,
    }
}

/// Number of attempts allowed for one request under `config`.
pub fn max_attempts(config: &RetryConfig) -> u32 {
    if config.enabled {
        config.max_attempts.max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ApiError;

    #[test]
    fn test_status_classification() {
        let unavailable = ClientError::Status { status: 503, body: String::new() };
        let not_found = ClientError::Status { status: 404, body: String::new() };
        assert!(is_retryable(&unavailable));
        assert!(!is_retryable(&not_found));
    }

    #[test]
    fn test_temporary_api_errors() {
        let mut error = ApiError::new("CH000", "internal");
        let permanent = ClientError::Api { status: 500, error: error.clone() };
        assert!(!is_retryable(&permanent));

        error.temporary = true;
        let temporary = ClientError::Api { status: 500, error };
        assert!(is_retryable(&temporary));
    }

    #[test]
    fn test_attempts_disabled() {
        let mut config = RetryConfig::default();
        config.max_attempts = 5;
        assert_eq!(max_attempts(&config), 1);

        config.enabled = true;
        assert_eq!(max_attempts(&config), 5);

        config.max_attempts = 0;
        assert_eq!(max_attempts(&config), 1);
    }
}
