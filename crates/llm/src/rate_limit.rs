//! Token-bucket limiter shared by every request a client issues.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::LlmError;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Allow `per_minute` requests per minute with bursts up to the same amount.
    #[must_use]
    pub fn per_minute(per_minute: u32) -> Self {
        let capacity = f64::from(per_minute.max(1));
        Self {
            capacity,
            refill_per_sec: capacity / 60.0,
            bucket: Mutex::new(Bucket { tokens: capacity, last_refill: Instant::now() }),
        }
    }

    /// Take a token if one is available now; otherwise report the wait time.
    pub async fn try_acquire(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut bucket = self.bucket.lock().await;
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(missing / self.refill_per_sec))
        }
    }

    /// Wait for a token, giving up if the next slot is further than `max_wait`.
    pub async fn acquire(&self, max_wait: Duration) -> Result<(), LlmError> {
        let deadline = Instant::now() + max_wait;
        loop {
            match self.try_acquire().await {
                Ok(()) => return Ok(()),
                Err(wait) => {
                    if Instant::now() + wait > deadline {
                        return Err(LlmError::RateLimited { wait });
                    }
                    tracing::debug!(?wait, "LLM rate limit reached, waiting for next slot");
                    tokio::time::sleep(wait).await;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_up_to_capacity_then_refuses() {
        let limiter = RateLimiter::per_minute(3);
        for _ in 0..3 {
            assert!(limiter.try_acquire().await.is_ok());
        }
        let wait = limiter.try_acquire().await.unwrap_err();
        assert!(wait > Duration::from_secs(10), "wait was {wait:?}");
        assert!(wait <= Duration::from_secs(20), "wait was {wait:?}");
    }

    #[tokio::test]
    async fn acquire_fails_fast_when_wait_exceeds_budget() {
        let limiter = RateLimiter::per_minute(1);
        limiter.acquire(Duration::from_millis(10)).await.unwrap();
        let err = limiter.acquire(Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn zero_rate_is_treated_as_one() {
        let limiter = RateLimiter::per_minute(0);
        assert!(limiter.try_acquire().await.is_ok());
        assert!(limiter.try_acquire().await.is_err());
    }
}
