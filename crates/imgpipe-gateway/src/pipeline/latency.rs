//! Simulated processing latency.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::config::LatencySection;

/// Injectable delay used to make the fake pipeline feel like real work.
#[async_trait]
pub trait LatencySim: Send + Sync {
    /// Suspend for some duration in `[0, max)`.
    async fn pause(&self, max: Duration);
}

/// Uniformly random sleep below the budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLatency;

#[async_trait]
impl LatencySim for RandomLatency {
    async fn pause(&self, max: Duration) {
        let max_ms = max.as_millis() as u64;
        if max_ms == 0 {
            return;
        }
        // ThreadRng is !Send; pick the value before awaiting.
        let ms = rand::thread_rng().gen_range(0..max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Never sleeps. Used when latency is disabled and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLatency;

#[async_trait]
impl LatencySim for NoLatency {
    async fn pause(&self, _max: Duration) {}
}

/// Per-operation upper bounds for the simulated delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBudgets {
    pub list: Duration,
    pub transition: Duration,
    pub login: Duration,
}

impl Default for LatencyBudgets {
    fn default() -> Self {
        Self::from(&LatencySection::default())
    }
}

impl From<&LatencySection> for LatencyBudgets {
    fn from(cfg: &LatencySection) -> Self {
        Self {
            list: Duration::from_millis(cfg.list_max_ms),
            transition: Duration::from_millis(cfg.transition_max_ms),
            login: Duration::from_millis(cfg.login_max_ms),
        }
    }
}
