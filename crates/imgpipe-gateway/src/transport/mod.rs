//! Transport layer (HTTP).
//!
//! Exposes the image API handlers, the login timing middleware, and the
//! mapping from pipeline results to HTTP responses.

pub mod http;
pub mod timing;
