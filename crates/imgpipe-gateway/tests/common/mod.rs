//! Shared helpers for gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use imgpipe_core::model::StatusCounts;
use imgpipe_gateway::app_state::AppState;
use imgpipe_gateway::config;
use imgpipe_gateway::pipeline::{MetricsSink, NoLatency};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Counts(StatusCounts),
    Request { method: String, status: String },
    Login,
}

/// Sink that remembers every call, in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record_counts(&self, counts: StatusCounts) {
        self.events.lock().unwrap().push(SinkEvent::Counts(counts));
    }

    fn observe_request(&self, method: &str, status: &str, _elapsed: Duration) {
        self.events.lock().unwrap().push(SinkEvent::Request {
            method: method.to_string(),
            status: status.to_string(),
        });
    }

    fn observe_login(&self, _elapsed: Duration) {
        self.events.lock().unwrap().push(SinkEvent::Login);
    }
}

/// Default config (demo seed) with latency disabled.
pub fn test_state() -> AppState {
    let cfg = config::load_from_str("version: 1\nlatency: { enabled: false }\n").unwrap();
    AppState::with_latency(cfg, Arc::new(NoLatency)).unwrap()
}
