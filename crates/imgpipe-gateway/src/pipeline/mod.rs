//! Request orchestration for the image API.
//!
//! Re-exports the coordinator and the two capabilities it depends on
//! (metrics sink, latency simulation) so downstream consumers can depend on
//! this module directly.

pub mod coordinator;
pub mod latency;
pub mod sink;

pub use coordinator::{Outcome, RequestCoordinator};
pub use latency::{LatencyBudgets, LatencySim, NoLatency, RandomLatency};
pub use sink::MetricsSink;
