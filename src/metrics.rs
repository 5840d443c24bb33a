//! Prometheus Metrics Module
//!
//! Pre-registered metrics for the selection engine.

use lazy_static::lazy_static;
use prometheus::{
    opts, register_gauge, register_int_counter_vec, register_int_gauge, Encoder, Gauge,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Selection cycles by outcome ("updated" or the retain reason)
    pub static ref SELECTION_CYCLES: IntCounterVec = register_int_counter_vec!(
        opts!("corrpairs_selection_cycles_total", "Pair selection cycles by outcome"),
        &["outcome"]
    ).expect("FATAL: Failed to register SELECTION_CYCLES metric - check for duplicate registration");

    /// Symbols with a fully aligned series in the last cycle
    pub static ref ALIGNED_SYMBOLS: IntGauge = register_int_gauge!(
        opts!("corrpairs_aligned_symbols", "Symbols with a fully aligned series in the last cycle")
    ).expect("FATAL: Failed to register ALIGNED_SYMBOLS metric - check for duplicate registration");

    /// Correlation of the stored best pair
    pub static ref BEST_PAIR_CORRELATION: Gauge = register_gauge!(
        opts!("corrpairs_best_pair_correlation", "Correlation of the currently selected pair")
    ).expect("FATAL: Failed to register BEST_PAIR_CORRELATION metric - check for duplicate registration");
}

/// Record the outcome of one selection cycle
pub fn record_cycle(outcome: &str) {
    SELECTION_CYCLES.with_label_values(&[outcome]).inc();
}

/// Update the aligned symbol gauge
pub fn set_aligned_symbols(count: usize) {
    ALIGNED_SYMBOLS.set(count as i64);
}

/// Update the best pair correlation gauge
pub fn set_best_pair_correlation(correlation: f64) {
    BEST_PAIR_CORRELATION.set(correlation);
}

/// Get metrics as text in the Prometheus exposition format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode Prometheus metrics: {}", e);
        return String::new();
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Prometheus metrics buffer is not valid UTF-8: {}", e);
            String::new()
        }
    }
}
