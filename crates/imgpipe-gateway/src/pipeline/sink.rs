use std::time::Duration;

use imgpipe_core::model::StatusCounts;

/// Where the coordinator reports state changes and timings.
/// Implementations own their own synchronization.
pub trait MetricsSink: Send + Sync {
    /// Publish freshly recomputed per-status totals.
    fn record_counts(&self, counts: StatusCounts);

    /// Image API request duration, labelled by method and response status.
    fn observe_request(&self, method: &str, status: &str, elapsed: Duration);

    /// Login request duration (reported by the timing middleware).
    fn observe_login(&self, elapsed: Duration);
}
