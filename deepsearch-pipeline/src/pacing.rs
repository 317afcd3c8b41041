//! Pause between search rounds.

use std::time::Duration;

use async_trait::async_trait;

/// Courtesy pause toward the search provider before each follow-up round.
pub const DEFAULT_ROUND_DELAY: Duration = Duration::from_secs(1);

#[async_trait]
pub trait RoundDelay: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_ROUND_DELAY)
    }
}

#[async_trait]
impl RoundDelay for FixedDelay {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RoundDelay for NoDelay {
    async fn pause(&self) {}
}
