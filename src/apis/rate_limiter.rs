//! Token-bucket rate limiting, one bucket per provider
//!
//! The bucket holds at most `capacity` tokens and refills continuously at
//! `capacity / period`. Waiters are served in arrival order: the state lock is
//! held across the sleep, and tokio's mutex is fair.

use crate::logger::{self, LogTag};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    key: String,
    capacity: f64,
    period: Duration,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Starts full. `capacity` is clamped to at least one token.
    pub fn new(key: &str, capacity: u32, period: Duration) -> Self {
        let capacity = capacity.max(1) as f64;
        Self {
            key: key.to_string(),
            capacity,
            period,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Take one token, sleeping until one is available
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        self.refill(&mut state);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            return;
        }

        let per_token = self.period.as_secs_f64() / self.capacity;
        let wait = Duration::from_secs_f64((1.0 - state.tokens) * per_token);
        logger::verbose(
            LogTag::RateLimit,
            &format!("{} bucket empty, waiting {}ms", self.key, wait.as_millis()),
        );

        tokio::time::sleep(wait).await;

        // The token that accrued during the sleep is consumed right away
        state.tokens = 0.0;
        state.last_refill = Instant::now();
    }

    /// Tokens currently available, refilled to now
    pub async fn available(&self) -> f64 {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        state.tokens
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill);
        if self.period.is_zero() {
            state.tokens = self.capacity;
        } else {
            let accrued = elapsed.as_secs_f64() * self.capacity / self.period.as_secs_f64();
            state.tokens = (state.tokens + accrued).min(self.capacity);
        }
        state.last_refill = now;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .field("period", &self.period)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_wait() {
        let limiter = RateLimiter::new("helius", 5, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(1));

        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(199), "waited {:?}", waited);
        assert!(waited <= Duration::from_millis(250), "waited {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_is_capped() {
        let limiter = RateLimiter::new("shyft", 5, Duration::from_secs(1));
        limiter.acquire().await;

        tokio::time::advance(Duration::from_secs(60)).await;
        let tokens = limiter.available().await;
        assert!(tokens <= 5.0);
        assert!(tokens >= 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throughput_bounded_over_window() {
        let limiter = Arc::new(RateLimiter::new("solanafm", 5, Duration::from_secs(1)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..15 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            }));
        }

        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }

        // Capacity 5 up front, then 5 per second: 15 grants need about 2s
        let last = grants.iter().max().copied().unwrap();
        assert!(last.duration_since(start) >= Duration::from_millis(1990));

        // No one-second window holds more than capacity + refill
        for window_start in &grants {
            let in_window = grants
                .iter()
                .filter(|t| **t >= *window_start && t.duration_since(*window_start) < Duration::from_secs(1))
                .count();
            assert!(in_window <= 10, "window had {}", in_window);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_clamped_to_one() {
        let limiter = RateLimiter::new("ledger", 0, Duration::from_secs(1));
        assert_eq!(limiter.capacity(), 1);
        limiter.acquire().await;
    }
}
