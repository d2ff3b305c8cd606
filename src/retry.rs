//! Controller-level retry policy
//!
//! Fixed-delay, bounded attempts. Only transient errors are retried;
//! network failures have already used the transport's own retries by the
//! time they reach a controller.

use crate::error::Error;
use std::time::Duration;

/// Bounded retry with a fixed backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Whether `err` on 1-based `attempt` gets another try
    pub fn should_retry(&self, err: &Error, attempt: u32) -> bool {
        err.is_transient() && attempt < self.max_attempts
    }
}
