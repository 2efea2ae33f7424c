use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform random delay range in milliseconds, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl JitterRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }

    /// Draw one delay from the range.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Sleep for a freshly sampled delay.
    pub async fn sleep(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::debug!("Sleeping {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}
