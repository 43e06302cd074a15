//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use imgpipe_core::error::{PipelineError, Result};

pub use schema::{
    AppSection, GatewayConfig, LatencySection, MetricsSection, SeedImage, ServerSection,
};

/// Config path used when `IMGPIPE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "imgpipe.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PipelineError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| PipelineError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the startup config.
///
/// An explicit path must exist. Without one, a missing `imgpipe.yaml`
/// falls back to built-in defaults.
pub fn load(explicit: Option<&str>) -> Result<GatewayConfig> {
    match explicit {
        Some(path) => load_from_file(path),
        None => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
            Ok(s) => load_from_str(&s),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
                let cfg = GatewayConfig::default();
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) => Err(PipelineError::Internal(format!(
                "read config failed ({DEFAULT_CONFIG_PATH}): {e}"
            ))),
        },
    }
}
