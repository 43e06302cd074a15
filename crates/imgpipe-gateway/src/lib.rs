//! imgpipe gateway library entry.
//!
//! This crate wires configuration, metrics, the request coordinator, the
//! routing table, and the HTTP transport into the two listeners of the
//! simulated image pipeline. It is consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod pipeline;
pub mod router;
pub mod transport;
