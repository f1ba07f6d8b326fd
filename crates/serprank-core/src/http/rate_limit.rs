//! Sliding-window rate limiting
//!
//! Bounds the outbound request rate to the provider's quota: at most
//! `max_requests` admissions within the trailing window. Admission order
//! for concurrent waiters is emergent, not FIFO.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use crate::error::{Error, Result};

/// Minimum sleep between admission checks while the window is full.
const RECHECK_FLOOR: Duration = Duration::from_millis(10);

/// Sliding-window admission control over a pruned timestamp list.
///
/// State is a plain `Vec<Instant>` behind a `Mutex`; the lock is never
/// held across an await point.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    timestamps: Mutex<Vec<Instant>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `max_requests` per `window`.
    ///
    /// A zero `max_requests` would make every wait spin forever, so it is
    /// rejected here.
    pub fn new(max_requests: u32, window: Duration) -> Result<Self> {
        if max_requests == 0 {
            return Err(Error::Configuration {
                message: "rate limiter max_requests cannot be zero".to_string(),
            });
        }
        if window.is_zero() {
            return Err(Error::Configuration {
                message: "rate limiter window cannot be zero".to_string(),
            });
        }
        Ok(Self {
            max_requests,
            window,
            timestamps: Mutex::new(Vec::new()),
        })
    }

    /// Create a limiter over the standard 60-second window.
    pub fn per_minute(max_requests: u32) -> Result<Self> {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Suspend until admitting one more request stays within the window
    /// cap, then record the admission.
    ///
    /// Implemented as an explicit loop: each pass either admits and
    /// returns, or computes how long until the oldest timestamp leaves the
    /// window and sleeps that long before rechecking.
    pub async fn wait_for_slot(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().expect("limiter mutex poisoned");
                let now = Instant::now();
                Self::prune(&mut timestamps, now, self.window);

                if (timestamps.len() as u32) < self.max_requests {
                    timestamps.push(now);
                    return;
                }

                // Pushes are monotonic, so the front entry is the oldest.
                let oldest = timestamps[0];
                self.window.saturating_sub(now.duration_since(oldest))
            };

            sleep(wait.max(RECHECK_FLOOR)).await;
        }
    }

    /// Remaining capacity in the current window. Never negative.
    pub fn available_slots(&self) -> u32 {
        let mut timestamps = self.timestamps.lock().expect("limiter mutex poisoned");
        Self::prune(&mut timestamps, Instant::now(), self.window);
        self.max_requests.saturating_sub(timestamps.len() as u32)
    }

    fn prune(timestamps: &mut Vec<Instant>, now: Instant, window: Duration) {
        timestamps.retain(|t| now.duration_since(*t) < window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_requests_rejected() {
        assert!(matches!(
            SlidingWindowLimiter::new(0, Duration::from_secs(60)),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(SlidingWindowLimiter::new(5, Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn test_admits_up_to_cap_immediately() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60)).unwrap();
        assert_eq!(limiter.available_slots(), 3);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait_for_slot().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.available_slots(), 0);
    }

    #[tokio::test]
    async fn test_excess_request_waits_for_window() {
        let window = Duration::from_millis(300);
        let limiter = SlidingWindowLimiter::new(2, window).unwrap();

        limiter.wait_for_slot().await;
        limiter.wait_for_slot().await;

        // The third admission must wait until the oldest timestamp leaves
        // the window.
        let start = Instant::now();
        limiter.wait_for_slot().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_available_slots_never_negative() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_millis(200)).unwrap();
        limiter.wait_for_slot().await;
        assert_eq!(limiter.available_slots(), 0);
        // Repeated reads while full stay at zero rather than underflowing.
        assert_eq!(limiter.available_slots(), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(limiter.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_window_recovers_capacity() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_millis(200)).unwrap();
        limiter.wait_for_slot().await;
        limiter.wait_for_slot().await;
        assert_eq!(limiter.available_slots(), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(limiter.available_slots(), 2);
    }
}
