//! Shared error type across imgpipe crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message.
    BadRequest,
    /// Unknown path or unusable image id.
    NotFound,
    /// Method not routed for this path.
    MethodNotAllowed,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Register payload is not a valid image record.
    #[error("{0}")]
    Decode(String),
    /// Path id is not a positive integer.
    #[error("invalid image id: {0:?}")]
    InvalidId(String),
    #[error("no route for {0}")]
    NotFound(String),
    #[error("method not allowed (allow: {allow})")]
    MethodNotAllowed { allow: String },
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            PipelineError::Decode(_) | PipelineError::BadRequest(_) => ClientCode::BadRequest,
            PipelineError::InvalidId(_) | PipelineError::NotFound(_) => ClientCode::NotFound,
            PipelineError::MethodNotAllowed { .. } => ClientCode::MethodNotAllowed,
            PipelineError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            PipelineError::Encode(_) | PipelineError::Internal(_) => ClientCode::Internal,
        }
    }
}
