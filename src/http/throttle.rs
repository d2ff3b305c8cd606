//! Client-side request throttle
//!
//! Token bucket from governor, applied before every outbound attempt
//! (retries included). Off unless configured.

use crate::error::{Error, Result};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Throttle settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back-to-back before throttling kicks in
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_burst() -> u32 {
    5
}

impl ThrottleConfig {
    /// Create throttle settings
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        Self {
            requests_per_second,
            burst,
        }
    }
}

/// Shared token bucket
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Build a throttle; zero rates are rejected
    pub fn new(config: ThrottleConfig) -> Result<Self> {
        let rate = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| Error::config("throttle requests_per_second must be > 0"))?;
        let burst = NonZeroU32::new(config.burst)
            .ok_or_else(|| Error::config("throttle burst must be > 0"))?;

        Ok(Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate).allow_burst(burst))),
        })
    }

    /// Wait for a permit
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish_non_exhaustive()
    }
}
