use std::sync::Arc;
use std::time::Instant;

use imgpipe_core::error::{PipelineError, Result};
use imgpipe_core::model::{parse_image_id, ImageRecord, ImageStatus};
use imgpipe_core::registry::ImageRegistry;

use super::latency::{LatencyBudgets, LatencySim};
use super::sink::MetricsSink;

pub const CREATED_BODY: &str = "Created Image!";
pub const ACCEPTED_BODY: &str = "Processed Image..";
pub const GREETING_BODY: &str = "Welcome to the image processing app!";

/// Successful result of one image API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Record registered (201).
    Created,
    /// JSON array of `Processing` records (200).
    Listed(String),
    /// Transition applied, or a no-op for an unknown id (202).
    Accepted,
    /// Static login greeting (200).
    Greeting,
}

impl Outcome {
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Created => 201,
            Outcome::Listed(_) | Outcome::Greeting => 200,
            Outcome::Accepted => 202,
        }
    }
}

/// Per-request orchestration: validate, touch the registry, report to the
/// sink, then simulate latency.
///
/// The registry lock is only held inside the registry call; the latency
/// pause always happens after it has been released.
pub struct RequestCoordinator {
    registry: Arc<ImageRegistry>,
    sink: Arc<dyn MetricsSink>,
    latency: Arc<dyn LatencySim>,
    budgets: LatencyBudgets,
}

impl RequestCoordinator {
    pub fn new(
        registry: Arc<ImageRegistry>,
        sink: Arc<dyn MetricsSink>,
        latency: Arc<dyn LatencySim>,
        budgets: LatencyBudgets,
    ) -> Self {
        Self {
            registry,
            sink,
            latency,
            budgets,
        }
    }

    pub fn registry(&self) -> &ImageRegistry {
        &self.registry
    }

    /// Decode `payload`, append it, and publish the new counts.
    /// A decode failure leaves both the registry and the sink untouched.
    pub async fn register_image(&self, payload: &[u8]) -> Result<Outcome> {
        let img = ImageRecord::from_json(payload)?;

        let counts = self.registry.create_and_count(img.clone());
        self.sink.record_counts(counts);

        tracing::info!(
            id = img.id,
            format = %img.format,
            resolution = %img.resolution,
            status = %img.status,
            "image created"
        );
        Ok(Outcome::Created)
    }

    pub async fn list_processing_images(&self) -> Result<Outcome> {
        let started = Instant::now();
        let images = self.registry.list_by_status(&ImageStatus::Processing);
        let body = serde_json::to_string(&images)
            .map_err(|e| PipelineError::Encode(e.to_string()))?;

        self.latency.pause(self.budgets.list).await;
        self.sink.observe_request("GET", "200", started.elapsed());

        tracing::info!(count = images.len(), "retrieved images being processed");
        Ok(Outcome::Listed(body))
    }

    /// Mark every record with the parsed id as `Processed`.
    ///
    /// An unparseable or non-positive id is rejected before the registry is
    /// touched. A well-formed id that matches nothing still succeeds.
    pub async fn transition_image(&self, raw_id: &str) -> Result<Outcome> {
        let id = parse_image_id(raw_id)?;

        let (found, counts) = self
            .registry
            .transition_and_count(id, ImageStatus::Processed);
        self.sink.record_counts(counts);

        self.latency.pause(self.budgets.transition).await;

        tracing::info!(id, found, "image processed");
        Ok(Outcome::Accepted)
    }

    /// Timing is reported by the wrapping middleware, not here.
    pub async fn login_greeting(&self) -> Outcome {
        self.latency.pause(self.budgets.login).await;
        Outcome::Greeting
    }
}
