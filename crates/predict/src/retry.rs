//! Retry policy
//!
//! One explicit policy type shared by both retry layers of the prediction
//! adapter: the outer message-level loop and the inner transport-level loop.

use std::time::Duration;

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed delay before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Sleep before retry number `attempt` (0 = first try, no sleep)
    pub async fn pause_before(&self, attempt: u32) {
        if attempt > 0 {
            tokio::time::sleep(self.delay).await;
        }
    }
}
