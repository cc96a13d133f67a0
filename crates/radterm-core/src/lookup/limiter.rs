use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Minimum-interval limiter shared by every caller of one client.
///
/// The watermark is held under the lock while sleeping, so concurrent callers
/// queue up and are released one interval apart.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Interval of `1 / requests_per_second`. Non-positive rates disable limiting.
    pub fn per_second(requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self::new(interval)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until a request may be sent, then stamp the watermark.
    pub fn wait(&self) {
        let mut last = self.last_request.lock().unwrap();

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!(?wait_time, "rate limiting");
                std::thread::sleep(wait_time);
            }
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let start = Instant::now();
        limiter.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn spaces_consecutive_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(30));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn shared_across_threads() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(20)));
        let start = Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let l = Arc::clone(&limiter);
                std::thread::spawn(move || l.wait())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn rate_to_interval() {
        assert_eq!(
            RateLimiter::per_second(20.0).min_interval(),
            Duration::from_millis(50)
        );
        assert_eq!(RateLimiter::per_second(0.0).min_interval(), Duration::ZERO);
    }
}
