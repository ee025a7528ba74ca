//! Request delays for `/wait`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::schema::BehaviorConfig;
use crate::generators::random::RandomSource;

/// Suspends the calling request. Only the awaiting task sleeps; other
/// requests keep being served.
#[async_trait]
pub trait Snoozer: Send + Sync {
    /// Sleep and report how long.
    async fn snooze(&self) -> Duration;
}

/// Always sleeps the same duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedSnoozer {
    duration: Duration,
}

impl FixedSnoozer {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Snoozer for FixedSnoozer {
    async fn snooze(&self) -> Duration {
        tokio::time::sleep(self.duration).await;
        self.duration
    }
}

/// Sleeps a duration drawn from `[min, max)`.
pub struct RangeSnoozer {
    min: Duration,
    max: Duration,
    random: Arc<dyn RandomSource>,
}

impl RangeSnoozer {
    pub fn new(min: Duration, max: Duration, random: Arc<dyn RandomSource>) -> Self {
        Self { min, max, random }
    }
}

#[async_trait]
impl Snoozer for RangeSnoozer {
    async fn snooze(&self) -> Duration {
        let duration = self.random.duration(self.min, self.max);
        tokio::time::sleep(duration).await;
        duration
    }
}

/// Pick the snoozer described by the delay settings.
pub fn from_config(config: &BehaviorConfig, random: Arc<dyn RandomSource>) -> Arc<dyn Snoozer> {
    if config.random_delay {
        Arc::new(RangeSnoozer::new(config.min_delay, config.max_delay, random))
    } else {
        Arc::new(FixedSnoozer::new(config.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::random::FixedRandom;
    use std::time::Instant;

    #[tokio::test]
    async fn fixed_snoozer_sleeps_its_duration() {
        let start = Instant::now();
        let slept = FixedSnoozer::new(Duration::from_millis(20)).snooze().await;
        assert_eq!(slept, Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn range_snoozer_uses_drawn_duration() {
        let random = Arc::new(FixedRandom::with_duration(Duration::from_millis(15)));
        let snoozer = RangeSnoozer::new(Duration::ZERO, Duration::from_secs(60), random);

        let start = Instant::now();
        assert_eq!(snoozer.snooze().await, Duration::from_millis(15));
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn snoozes_run_concurrently() {
        let snoozer = Arc::new(FixedSnoozer::new(Duration::from_millis(100)));
        let start = Instant::now();
        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let snoozer = snoozer.clone();
                tokio::spawn(async move { snoozer.snooze().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(900));
    }
}
