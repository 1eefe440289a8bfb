//! Delay between confirmation rounds.

use std::time::Duration;

use rand::Rng;

use crate::config::{BackoffKind, ConfirmationConfig};

/// Exponential delay with up to 10% jitter.
///
/// `attempt` counts failed rounds so far; attempt 0 yields no delay.
pub fn exponential_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.saturating_pow(attempt - 1);
    let capped = base.saturating_mul(factor).min(max);

    let jitter_ms = (capped.as_millis() / 10) as u64;
    let jitter = if jitter_ms > 0 {
        Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    } else {
        Duration::ZERO
    };

    capped + jitter
}

/// Delay policy applied after each failed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDelay {
    /// Same delay every time.
    Fixed(Duration),
    Exponential { base: Duration, max: Duration },
}

impl PollDelay {
    pub fn from_config(config: &ConfirmationConfig) -> Self {
        match config.backoff {
            BackoffKind::Fixed => Self::Fixed(config.poll_interval()),
            BackoffKind::Exponential => Self::Exponential {
                base: config.poll_interval(),
                max: Duration::from_millis(config.max_delay_ms),
            },
        }
    }

    /// Delay to wait after `failed_rounds` consecutive failed rounds.
    pub fn delay_for(&self, failed_rounds: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => exponential_delay(failed_rounds, base, max),
        }
    }
}

impl Default for PollDelay {
    fn default() -> Self {
        Self::from_config(&ConfirmationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_never_grows() {
        let delay = PollDelay::default();
        assert_eq!(delay, PollDelay::Fixed(Duration::from_millis(3000)));
        assert_eq!(delay.delay_for(1), Duration::from_millis(3000));
        assert_eq!(delay.delay_for(50), Duration::from_millis(3000));
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(1000);

        assert_eq!(exponential_delay(0, base, max), Duration::ZERO);
        assert!(exponential_delay(1, base, max) >= Duration::from_millis(100));
        assert!(exponential_delay(3, base, max) >= Duration::from_millis(400));

        let capped = exponential_delay(20, base, max);
        assert!(capped >= max);
        assert!(capped < max + Duration::from_millis(100));
    }
}
