use tokio::time::{Duration, Instant};

/// Bounds the rate at which a shard's consumer dequeues keys.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RateLimit {
    /// Sustained keys per second. Zero disables rate limiting.
    pub qps: u32,

    /// The number of keys that may be dequeued back-to-back.
    pub burst: u32,
}

/// A token bucket that hands out reservations.
///
/// The token count may go negative: each reservation is granted immediately along with the time
/// the caller must wait before acting on it, so concurrent callers queue up behind each other.
#[derive(Debug)]
pub(crate) struct TokenBucket {
    limit: RateLimit,
    tokens: f64,
    last: Option<Instant>,
}

// === impl RateLimit ===

impl RateLimit {
    pub const UNLIMITED: Self = Self { qps: 0, burst: 0 };

    pub fn new(qps: u32, burst: u32) -> Self {
        Self { qps, burst }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self { qps: 10, burst: 100 }
    }
}

// === impl TokenBucket ===

impl TokenBucket {
    pub(crate) fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            tokens: limit.burst.max(1) as f64,
            last: None,
        }
    }

    /// Takes a token, returning how long the caller must wait before using it.
    pub(crate) fn reserve(&mut self, now: Instant) -> Duration {
        if self.limit.qps == 0 {
            return Duration::ZERO;
        }

        let rate = self.limit.qps as f64;
        let capacity = self.limit.burst.max(1) as f64;
        if let Some(last) = self.last {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.tokens = (self.tokens + elapsed * rate).min(capacity);
        }
        self.last = Some(now);

        self.tokens -= 1.0;
        if self.tokens >= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(-self.tokens / rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_waits() {
        let mut bucket = TokenBucket::new(RateLimit::UNLIMITED);
        let now = Instant::now();
        for _ in 0..1000 {
            assert_eq!(bucket.reserve(now), Duration::ZERO);
        }
    }

    #[test]
    fn burst_then_paced() {
        let mut bucket = TokenBucket::new(RateLimit::new(10, 3));
        let now = Instant::now();
        for _ in 0..3 {
            assert_eq!(bucket.reserve(now), Duration::ZERO);
        }
        // The fourth token is available after 1/qps.
        assert_eq!(bucket.reserve(now), Duration::from_millis(100));
        // The fifth queues up behind the fourth.
        assert_eq!(bucket.reserve(now), Duration::from_millis(200));
    }

    #[test]
    fn refills_over_time() {
        let mut bucket = TokenBucket::new(RateLimit::new(10, 1));
        let now = Instant::now();
        assert_eq!(bucket.reserve(now), Duration::ZERO);
        assert_eq!(
            bucket.reserve(now + Duration::from_millis(100)),
            Duration::ZERO
        );
        // Refill is capped at the burst size.
        let later = now + Duration::from_secs(10);
        assert_eq!(bucket.reserve(later), Duration::ZERO);
        assert_ne!(bucket.reserve(later), Duration::ZERO);
    }
}
