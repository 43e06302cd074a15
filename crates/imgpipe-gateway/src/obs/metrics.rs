//! Metrics registry for the image pipeline.
//!
//! Label sets are flattened into sorted key vectors to keep deterministic
//! ordering inside a family. Histogram sums are accumulated in microseconds
//! to avoid float atomics and rendered in seconds.

use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use imgpipe_core::model::StatusCounts;

use crate::pipeline::MetricsSink;

/// Prefix shared by every exported family.
pub const NAMESPACE: &str = "myapp";

/// Request duration buckets, in seconds.
pub const REQUEST_BUCKETS: [f64; 5] = [0.1, 0.15, 0.2, 0.25, 0.3];

/// Login summary quantiles.
pub const LOGIN_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Unlabelled gauge.
#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "gauge");
        let _ = writeln!(out, "{} {}", name, self.get());
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self.map.entry(label_key(labels)).or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        self.map
            .get(&label_key(labels))
            .map(|g| g.value().load(Ordering::Relaxed))
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "gauge");
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: Vec<AtomicU64>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

pub struct HistogramVec {
    bounds: &'static [f64],
    map: DashMap<Vec<(String, String)>, AtomicHistogram>,
}

impl HistogramVec {
    /// `bounds` are upper bucket limits in seconds, ascending.
    pub fn new(bounds: &'static [f64]) -> Self {
        Self {
            bounds,
            map: DashMap::new(),
        }
    }

    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicHistogram::new(self.bounds.len()));
        let secs = duration.as_secs_f64();

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        for (i, &b) in self.bounds.iter().enumerate() {
            if secs <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "histogram");
        for r in self.map.iter() {
            let hist = r.value();
            let labels = label_str(r.key());
            let prefix = if labels.is_empty() { String::new() } else { format!("{},", labels) };

            for (i, le) in self.bounds.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

struct SummaryState {
    window: VecDeque<(Instant, f64)>,
    count: u64,
    sum: f64,
}

/// Quantile summary over a sliding window.
///
/// Quantiles cover observations younger than `max_age` (at most
/// `max_samples` of them); `_sum` and `_count` cover every observation.
pub struct Summary {
    quantiles: &'static [f64],
    max_age: Duration,
    max_samples: usize,
    state: Mutex<SummaryState>,
}

impl Summary {
    pub fn new(quantiles: &'static [f64], max_age: Duration, max_samples: usize) -> Self {
        Self {
            quantiles,
            max_age,
            max_samples: max_samples.max(1),
            state: Mutex::new(SummaryState {
                window: VecDeque::new(),
                count: 0,
                sum: 0.0,
            }),
        }
    }

    pub fn observe(&self, duration: Duration) {
        let now = Instant::now();
        let v = duration.as_secs_f64();
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        s.count += 1;
        s.sum += v;
        s.window.push_back((now, v));
        while s.window.len() > self.max_samples {
            s.window.pop_front();
        }
        Self::expire(&mut s.window, now, self.max_age);
    }

    fn expire(window: &mut VecDeque<(Instant, f64)>, now: Instant, max_age: Duration) {
        while let Some(&(t, _)) = window.front() {
            if now.duration_since(t) > max_age {
                window.pop_front();
            } else {
                break;
            }
        }
    }

    /// `(quantile, value)` pairs; `NaN` when the window is empty.
    pub fn quantiles(&self) -> Vec<(f64, f64)> {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Self::expire(&mut s.window, Instant::now(), self.max_age);
        let mut values: Vec<f64> = s.window.iter().map(|(_, v)| *v).collect();
        drop(s);
        values.sort_by(f64::total_cmp);

        self.quantiles
            .iter()
            .map(|&q| {
                if values.is_empty() {
                    return (q, f64::NAN);
                }
                let rank = (q * values.len() as f64).ceil() as usize;
                (q, values[rank.clamp(1, values.len()) - 1])
            })
            .collect()
    }

    pub fn count(&self) -> u64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).count
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "summary");
        for (q, v) in self.quantiles() {
            let _ = writeln!(out, "{}{{quantile=\"{}\"}} {}", name, q, v);
        }
        let (sum, count) = {
            let s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            (s.sum, s.count)
        };
        let _ = writeln!(out, "{}_sum {}", name, sum);
        let _ = writeln!(out, "{}_count {}", name, count);
    }
}

pub struct PipelineMetrics {
    pub processing_images: Gauge,
    pub processed_images: Gauge,
    pub info: GaugeVec,
    pub request_duration: HistogramVec,
    pub login_duration: Summary,
}

impl PipelineMetrics {
    pub fn new(summary_max_age: Duration, summary_max_samples: usize) -> Self {
        Self {
            processing_images: Gauge::default(),
            processed_images: Gauge::default(),
            info: GaugeVec::default(),
            request_duration: HistogramVec::new(&REQUEST_BUCKETS),
            login_duration: Summary::new(&LOGIN_QUANTILES, summary_max_age, summary_max_samples),
        }
    }

    /// Export the build version as `myapp_info{version=...} 1`.
    pub fn set_build_info(&self, version: &str) {
        self.info.set(&[("version", version)], 1);
    }

    /// Render all families.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.processing_images.render(
            &format!("{NAMESPACE}_processing_images"),
            "Number of images currently being processed.",
            &mut out,
        );
        self.info.render(
            &format!("{NAMESPACE}_info"),
            "Information about the image processing environment.",
            &mut out,
        );
        self.processed_images.render(
            &format!("{NAMESPACE}_processed_images"),
            "Number of images processed.",
            &mut out,
        );
        self.request_duration.render(
            &format!("{NAMESPACE}_request_duration_seconds"),
            "Duration of the request for image processing.",
            &mut out,
        );
        self.login_duration.render(
            &format!("{NAMESPACE}_login_request_duration_seconds"),
            "Duration of the login request.",
            &mut out,
        );
        out
    }
}

impl MetricsSink for PipelineMetrics {
    fn record_counts(&self, counts: StatusCounts) {
        self.processing_images.set(counts.processing as i64);
        self.processed_images.set(counts.processed as i64);
    }

    fn observe_request(&self, method: &str, status: &str, elapsed: Duration) {
        self.request_duration
            .observe(&[("method", method), ("status", status)], elapsed);
    }

    fn observe_login(&self, elapsed: Duration) {
        self.login_duration.observe(elapsed);
    }
}
