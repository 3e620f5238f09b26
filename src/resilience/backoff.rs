//! Delay between retries of one signer or ledger request.

use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Delay to wait after `failed` attempts of a request have failed.
///
/// Doubles from `base_delay_ms` and never exceeds `max_delay_ms`. Up to a
/// tenth of the delay is shaved off at random so concurrent callers
/// retrying the same signer spread out.
pub fn retry_delay(retries: &RetryConfig, failed: u32) -> Duration {
    if failed == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(failed - 1).unwrap_or(u64::MAX);
    let delay_ms = retries
        .base_delay_ms
        .saturating_mul(factor)
        .min(retries.max_delay_ms);

    let spread = delay_ms / 10;
    let jitter = if spread > 0 {
        rand::thread_rng().gen_range(0..=spread)
    } else {
        0
    };

    Duration::from_millis(delay_ms - jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retries(base_delay_ms: u64, max_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_attempts: 5,
            base_delay_ms,
            max_delay_ms,
        }
    }

    #[test]
    fn test_delay_doubles_per_failure() {
        let config = retries(100, 2000);

        let d1 = retry_delay(&config, 1).as_millis();
        assert!((90..=100).contains(&d1));

        let d2 = retry_delay(&config, 2).as_millis();
        assert!((180..=200).contains(&d2));
    }

    #[test]
    fn test_delay_never_exceeds_max() {
        let config = retries(100, 1000);
        for failed in 1..20 {
            assert!(retry_delay(&config, failed).as_millis() <= 1000);
        }
    }

    #[test]
    fn test_no_delay_before_first_failure() {
        assert_eq!(retry_delay(&retries(100, 2000), 0), Duration::ZERO);
    }

    #[test]
    fn test_huge_failure_count_saturates() {
        let d = retry_delay(&retries(u64::MAX / 2, 5000), 200);
        assert!((4500..=5000).contains(&d.as_millis()));
    }
}
