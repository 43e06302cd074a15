//! Shared application state for the imgpipe gateway.
//!
//! Wires the seeded registry, the metrics registry (which doubles as the
//! coordinator's `MetricsSink`), the latency simulator, and the coordinator.

use std::sync::Arc;
use std::time::Duration;

use imgpipe_core::error::Result;
use imgpipe_core::registry::ImageRegistry;

use crate::config::GatewayConfig;
use crate::obs::PipelineMetrics;
use crate::pipeline::{
    LatencyBudgets, LatencySim, MetricsSink, NoLatency, RandomLatency, RequestCoordinator,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<PipelineMetrics>,
    coordinator: Arc<RequestCoordinator>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state, choosing the latency simulator from config.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let latency: Arc<dyn LatencySim> = if cfg.latency.enabled {
            Arc::new(RandomLatency)
        } else {
            Arc::new(NoLatency)
        };
        Self::with_latency(cfg, latency)
    }

    /// Build application state with an explicit latency simulator.
    pub fn with_latency(cfg: GatewayConfig, latency: Arc<dyn LatencySim>) -> Result<Self> {
        cfg.validate()?;

        // 1) Registry seeded from config
        let registry = Arc::new(ImageRegistry::with_seed(cfg.seed_records()));

        // 2) Metrics: build info + gauges consistent with the seed
        let metrics = Arc::new(PipelineMetrics::new(
            Duration::from_secs(cfg.metrics.summary_max_age_secs),
            cfg.metrics.summary_max_samples,
        ));
        metrics.set_build_info(&cfg.app.version);
        metrics.record_counts(registry.count_by_status());

        // 3) Coordinator
        let sink: Arc<dyn MetricsSink> = metrics.clone();
        let coordinator = Arc::new(RequestCoordinator::new(
            registry,
            sink,
            latency,
            LatencyBudgets::from(&cfg.latency),
        ));

        tracing::debug!(seeded = cfg.seed.len(), version = %cfg.app.version, "app state ready");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            metrics,
            coordinator,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn sink(&self) -> &dyn MetricsSink {
        self.metrics.as_ref()
    }

    pub fn coordinator(&self) -> Arc<RequestCoordinator> {
        Arc::clone(&self.coordinator)
    }
}
