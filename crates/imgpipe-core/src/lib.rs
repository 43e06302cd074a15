//! imgpipe core: transport-agnostic image model, the in-memory registry, and
//! the shared error type.
//!
//! This crate owns the state of the simulated pipeline (which images exist and
//! whether they are still `Processing`). It carries no transport or runtime
//! dependencies so the gateway, tests, and tooling can all drive it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `PipelineError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod registry;

/// Shared result type.
pub use error::{PipelineError, Result};
pub use model::{parse_image_id, ImageId, ImageRecord, ImageStatus, StatusCounts};
pub use registry::ImageRegistry;
