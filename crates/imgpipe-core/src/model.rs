//! Image records as clients register and list them.
//!
//! JSON field names are fixed for wire compatibility:
//! `{"id": int, "format": string, "resolution": string, "img_status": string}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Caller-assigned image id. Uniqueness is not enforced.
pub type ImageId = i64;

/// Lifecycle status of an image.
///
/// Only `Processing -> Processed` is modelled. Creators may still submit any
/// other string; it is kept verbatim in `Other` and never counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageStatus {
    Processing,
    Processed,
    Other(String),
}

impl ImageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ImageStatus::Processing => "Processing",
            ImageStatus::Processed => "Processed",
            ImageStatus::Other(s) => s,
        }
    }
}

impl Default for ImageStatus {
    /// A missing `img_status` decodes to the empty string.
    fn default() -> Self {
        ImageStatus::Other(String::new())
    }
}

impl From<String> for ImageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Processing" => ImageStatus::Processing,
            "Processed" => ImageStatus::Processed,
            _ => ImageStatus::Other(s),
        }
    }
}

impl From<&str> for ImageStatus {
    fn from(s: &str) -> Self {
        ImageStatus::from(s.to_string())
    }
}

impl From<ImageStatus> for String {
    fn from(status: ImageStatus) -> Self {
        match status {
            ImageStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked image.
///
/// Missing fields decode to zero values (`id` 0, empty strings) and unknown
/// fields are ignored; no validation happens at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRecord {
    pub id: ImageId,
    pub format: String,
    pub resolution: String,
    #[serde(rename = "img_status")]
    pub status: ImageStatus,
}

impl ImageRecord {
    pub fn new(
        id: ImageId,
        format: impl Into<String>,
        resolution: impl Into<String>,
        status: impl Into<ImageStatus>,
    ) -> Self {
        Self {
            id,
            format: format.into(),
            resolution: resolution.into(),
            status: status.into(),
        }
    }

    /// Decode a register payload. Structural problems become `Decode` errors
    /// carrying the parser message.
    ///
    /// Only the first JSON value is read; anything after it is ignored. A
    /// `null` value decodes to the zero record. An empty body is an error.
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        let mut values = serde_json::Deserializer::from_slice(payload).into_iter::<Option<Self>>();
        match values.next() {
            Some(Ok(record)) => Ok(record.unwrap_or_default()),
            Some(Err(e)) => Err(PipelineError::Decode(e.to_string())),
            None => Err(PipelineError::Decode("EOF".into())),
        }
    }
}

/// Parse a path segment into an image id. Anything that is not an integer
/// `>= 1` is rejected.
pub fn parse_image_id(raw: &str) -> Result<ImageId> {
    raw.parse::<ImageId>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| PipelineError::InvalidId(raw.to_string()))
}

/// Derived per-status totals. Statuses other than `Processing` and
/// `Processed` land in neither bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub processing: usize,
    pub processed: usize,
}

impl StatusCounts {
    /// Full scan over `records`.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a ImageRecord>) -> Self {
        let mut counts = StatusCounts::default();
        for r in records {
            match r.status {
                ImageStatus::Processing => counts.processing += 1,
                ImageStatus::Processed => counts.processed += 1,
                ImageStatus::Other(_) => {}
            }
        }
        counts
    }
}
