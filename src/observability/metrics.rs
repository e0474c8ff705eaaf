//! Metrics collection.
//!
//! # Metrics
//! - `request_digest_total` (counter): digests by outcome and algorithm
//! - `request_digest_duration_seconds` (histogram): time spent per call
//!
//! # Design Decisions
//! - Low-overhead metric updates through the `metrics` facade
//! - Outcome label is one of `computed`, `absent`, `failed`

use std::time::Instant;

pub const OUTCOME_COMPUTED: &str = "computed";
pub const OUTCOME_ABSENT: &str = "absent";
pub const OUTCOME_FAILED: &str = "failed";

/// Record one `compute_digest` call.
pub fn record_digest(outcome: &'static str, algorithm: &'static str, start: Instant) {
    metrics::counter!(
        "request_digest_total",
        "outcome" => outcome,
        "algorithm" => algorithm
    )
    .increment(1);
    metrics::histogram!("request_digest_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a configuration reload attempt.
pub fn record_reload(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    metrics::counter!("request_digest_config_reloads_total", "result" => result).increment(1);
}
