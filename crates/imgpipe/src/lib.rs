//! Top-level facade crate for imgpipe.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use imgpipe_core::*;
}

pub mod gateway {
    pub use imgpipe_gateway::*;
}
