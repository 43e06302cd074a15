//! Lightweight in-process metrics.
//!
//! Gauges, a labelled histogram, and a windowed summary stored as atomics or
//! behind short locks, rendered in Prometheus text format by the `/metrics`
//! handler on the metrics listener.

pub mod metrics;

pub use metrics::PipelineMetrics;
