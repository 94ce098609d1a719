//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Queue intake (accepted and rejected files)
//! - Conversion runs and per-file conversions
//! - Artifact export

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Queue Metrics
// =============================================================================

/// Files accepted into the queue.
pub static FILES_ENQUEUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fileshift_files_enqueued_total",
        "Total files accepted into the queue",
    )
    .unwrap()
});

/// Files rejected by validation.
pub static FILES_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fileshift_files_rejected_total",
        "Total files rejected by validation",
    )
    .unwrap()
});

/// Runs started.
pub static RUNS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("fileshift_runs_total", "Total conversion runs started").unwrap()
});

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions total by result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fileshift_conversions_total", "Total file conversions"),
        &["result"], // "success", "failed", "unsupported"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fileshift_conversion_duration_seconds",
            "Duration of single-file conversions",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["converter"],
    )
    .unwrap()
});

// =============================================================================
// Export Metrics
// =============================================================================

/// Artifact exports by result.
pub static EXPORTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fileshift_exports_total", "Total artifact exports"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FILES_ENQUEUED.clone()),
        Box::new(FILES_REJECTED.clone()),
        Box::new(RUNS_TOTAL.clone()),
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(EXPORTS_TOTAL.clone()),
    ]
}
