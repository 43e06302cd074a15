use std::net::SocketAddr;

use imgpipe_core::error::{PipelineError, Result};
use imgpipe_core::model::{ImageRecord, ImageStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub latency: LatencySection,

    /// Records registered at startup. Omitted means the two demo images;
    /// an explicit empty list starts with an empty registry.
    #[serde(default = "default_seed")]
    pub seed: Vec<SeedImage>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            app: AppSection::default(),
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
            latency: LatencySection::default(),
            seed: default_seed(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PipelineError::UnsupportedVersion);
        }

        self.app.validate()?;
        let api = self.server.listen_addr()?;
        let metrics = self.metrics.listen_addr()?;
        if api == metrics {
            return Err(PipelineError::BadRequest(
                "server.listen and metrics.listen must differ".into(),
            ));
        }
        self.metrics.validate()?;
        self.latency.validate()?;

        Ok(())
    }

    pub fn seed_records(&self) -> Vec<ImageRecord> {
        self.seed.iter().cloned().map(ImageRecord::from).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Build version exported as the `version` label of `myapp_info`.
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self { version: default_app_version() }
    }
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(PipelineError::BadRequest("app.version must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_api_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_api_listen() }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen("server.listen", &self.listen)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_listen")]
    pub listen: String,

    #[serde(default = "default_summary_max_age_secs")]
    pub summary_max_age_secs: u64,

    #[serde(default = "default_summary_max_samples")]
    pub summary_max_samples: usize,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            listen: default_metrics_listen(),
            summary_max_age_secs: default_summary_max_age_secs(),
            summary_max_samples: default_summary_max_samples(),
        }
    }
}

impl MetricsSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen("metrics.listen", &self.listen)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.summary_max_age_secs) {
            return Err(PipelineError::BadRequest(
                "metrics.summary_max_age_secs must be between 1 and 86400".into(),
            ));
        }
        if self.summary_max_samples == 0 {
            return Err(PipelineError::BadRequest(
                "metrics.summary_max_samples must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatencySection {
    #[serde(default = "default_latency_enabled")]
    pub enabled: bool,

    #[serde(default = "default_list_max_ms")]
    pub list_max_ms: u64,

    #[serde(default = "default_transition_max_ms")]
    pub transition_max_ms: u64,

    #[serde(default = "default_login_max_ms")]
    pub login_max_ms: u64,
}

impl Default for LatencySection {
    fn default() -> Self {
        Self {
            enabled: default_latency_enabled(),
            list_max_ms: default_list_max_ms(),
            transition_max_ms: default_transition_max_ms(),
            login_max_ms: default_login_max_ms(),
        }
    }
}

const MAX_LATENCY_MS: u64 = 60_000;

impl LatencySection {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("latency.list_max_ms", self.list_max_ms),
            ("latency.transition_max_ms", self.transition_max_ms),
            ("latency.login_max_ms", self.login_max_ms),
        ] {
            if v > MAX_LATENCY_MS {
                return Err(PipelineError::BadRequest(format!(
                    "{name} must be at most {MAX_LATENCY_MS}"
                )));
            }
        }
        Ok(())
    }
}

/// Seed entry; same shape as the register payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedImage {
    pub id: i64,
    pub format: String,
    pub resolution: String,
    pub img_status: String,
}

impl From<SeedImage> for ImageRecord {
    fn from(s: SeedImage) -> Self {
        ImageRecord::new(s.id, s.format, s.resolution, ImageStatus::from(s.img_status))
    }
}

fn parse_listen(field: &str, v: &str) -> Result<SocketAddr> {
    v.parse()
        .map_err(|e| PipelineError::BadRequest(format!("{field} must be a valid SocketAddr: {e}")))
}

fn default_app_version() -> String {
    "2.10.5".into()
}
fn default_api_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_listen() -> String {
    "0.0.0.0:8081".into()
}
fn default_summary_max_age_secs() -> u64 {
    600
}
fn default_summary_max_samples() -> usize {
    4096
}
fn default_latency_enabled() -> bool {
    true
}
fn default_list_max_ms() -> u64 {
    200
}
fn default_transition_max_ms() -> u64 {
    1000
}
fn default_login_max_ms() -> u64 {
    200
}

fn default_seed() -> Vec<SeedImage> {
    vec![
        SeedImage {
            id: 1,
            format: "JPEG".into(),
            resolution: "1920x1080".into(),
            img_status: "Processing".into(),
        },
        SeedImage {
            id: 2,
            format: "PNG".into(),
            resolution: "1280x720".into(),
            img_status: "Processing".into(),
        },
    ]
}
