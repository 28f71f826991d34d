use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use configs::RateLimitConfig;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::errors::ApiError;

/// Buckets idle this long are dropped once the table grows past its cap.
const IDLE_EVICTION: Duration = Duration::from_secs(300);
const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    tokens: f64,
    refill_rate: u64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u64, refill_rate: u64) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    pub fn try_acquire(&mut self, tokens: u64) -> bool {
        self.refill();

        let wanted = tokens as f64;
        if self.tokens >= wanted {
            self.tokens -= wanted;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let added = elapsed.as_secs_f64() * self.refill_rate as f64;
        self.tokens = (self.tokens + added).min(self.capacity as f64);
        self.last_refill = now;
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_refill)
    }
}

/// Per-client token buckets keyed by peer IP.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<DashMap<IpAddr, TokenBucket>>,
    requests_per_second: u64,
    burst: u64,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(requests_per_second: u64, burst_size: u64, enabled: bool) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            requests_per_second,
            burst: burst_size,
            enabled,
        }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.requests_per_second, cfg.burst, cfg.enabled)
    }

    pub fn check(&self, client: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }
        if self.buckets.len() > MAX_TRACKED_CLIENTS {
            self.evict_idle();
        }
        let mut bucket = self
            .buckets
            .entry(client)
            .or_insert_with(|| TokenBucket::new(self.burst, self.requests_per_second));
        bucket.try_acquire(1)
    }

    fn evict_idle(&self) {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| bucket.idle_for(now) < IDLE_EVICTION);
        debug!(before, after = self.buckets.len(), "evicted idle rate-limit buckets");
    }
}

/// Requests without connection info (e.g. in-process test clients) share one
/// bucket.
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let client = client_ip(&req);
    if limiter.check(client) {
        next.run(req).await
    } else {
        warn!(%client, path = %req.uri().path(), "rate limit exceeded");
        ApiError::TooManyRequests.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const CLIENT_A: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const CLIENT_B: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_token_bucket_basic() {
        let mut bucket = TokenBucket::new(10, 5);

        assert!(bucket.try_acquire(5));
        assert!(bucket.try_acquire(5));
        assert!(!bucket.try_acquire(1));
    }

    #[tokio::test]
    async fn test_token_bucket_refill() {
        let mut bucket = TokenBucket::new(10, 10);

        assert!(bucket.try_acquire(10));
        assert!(!bucket.try_acquire(1));

        sleep(Duration::from_millis(1100)).await;

        assert!(bucket.try_acquire(10));
    }

    #[test]
    fn clients_have_separate_budgets() {
        let limiter = RateLimiter::new(1, 2, true);
        assert!(limiter.check(CLIENT_A));
        assert!(limiter.check(CLIENT_A));
        assert!(!limiter.check(CLIENT_A));
        assert!(limiter.check(CLIENT_B));
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let limiter = RateLimiter::new(1, 1, false);
        for _ in 0..100 {
            assert!(limiter.check(CLIENT_A));
        }
    }
}
