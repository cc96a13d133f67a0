use std::time::Duration;

use rand::Rng;

use crate::settings::LookupSettings;

/// HTTP statuses worth another attempt.
const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Bounded exponential backoff with uniform jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base delay in seconds; also the jitter range.
    pub backoff_base: f64,
    /// Cap on the exponential part in seconds.
    pub backoff_max: f64,
    /// Give up once a single term's retries have taken this long.
    pub max_elapsed: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff_base: 0.6,
            backoff_max: 8.0,
            max_elapsed: None,
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(s: &LookupSettings) -> Self {
        Self {
            max_attempts: s.max_retries.max(1),
            backoff_base: s.backoff_base,
            backoff_max: s.backoff_max,
            max_elapsed: s.max_elapsed(),
        }
    }

    /// `min(backoff_max, base · 2^(attempt−1)) + uniform(0, base)`; `attempt` is 1-based.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = 2f64.powi(attempt.saturating_sub(1).min(30) as i32);
        let delay = (self.backoff_base * exp).min(self.backoff_max);
        let jitter = if self.backoff_base > 0.0 {
            rand::thread_rng().gen_range(0.0..self.backoff_base)
        } else {
            0.0
        };
        Duration::from_secs_f64((delay + jitter).max(0.0))
    }

    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Delay before the next attempt: a numeric `Retry-After` header wins
    /// over computed backoff.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(parse_retry_after)
            .unwrap_or_else(|| self.backoff(attempt))
    }
}

/// Seconds form of `Retry-After`. HTTP-date values are not honoured.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}
