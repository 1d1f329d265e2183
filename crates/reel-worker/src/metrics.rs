//! Render metrics.
//!
//! Recorded through the `metrics` facade; whichever recorder the host process
//! installs (the API's Prometheus exporter, or none for the CLI) receives them.

use metrics::{counter, gauge, histogram};
use reel_models::{EncodingStrategyKind, JobStage};

pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "reel_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "reel_jobs_failed_total";
    pub const JOBS_IN_FLIGHT: &str = "reel_jobs_in_flight";
    pub const JOB_DURATION_SECONDS: &str = "reel_job_duration_seconds";
    pub const FETCH_DURATION_SECONDS: &str = "reel_fetch_duration_seconds";
    pub const ENCODE_DURATION_SECONDS: &str = "reel_encode_duration_seconds";
    pub const ENCODE_STRATEGY_TOTAL: &str = "reel_encode_strategy_total";
    pub const ENCODE_ATTEMPTS_TOTAL: &str = "reel_encode_attempts_total";
    pub const UPLOAD_FAILURES_TOTAL: &str = "reel_upload_failures_total";
}

pub fn record_job_started() {
    gauge!(names::JOBS_IN_FLIGHT).increment(1.0);
}

pub fn record_job_completed(strategy: EncodingStrategyKind, duration_secs: f64) {
    gauge!(names::JOBS_IN_FLIGHT).decrement(1.0);
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, "outcome" => "succeeded").record(duration_secs);
    counter!(names::ENCODE_STRATEGY_TOTAL, "strategy" => strategy.as_str()).increment(1);
}

pub fn record_job_failed(stage: JobStage, error_kind: &str, duration_secs: f64) {
    let labels = [
        ("stage", stage.as_str().to_string()),
        ("error_kind", error_kind.to_string()),
    ];
    gauge!(names::JOBS_IN_FLIGHT).decrement(1.0);
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, "outcome" => "failed").record(duration_secs);
}

pub fn record_fetch(duration_secs: f64) {
    histogram!(names::FETCH_DURATION_SECONDS).record(duration_secs);
}

/// One sample per strategy attempt, successful or not.
pub fn record_encode_attempt(strategy: EncodingStrategyKind, succeeded: bool, duration_secs: f64) {
    let labels = [
        ("strategy", strategy.as_str().to_string()),
        ("succeeded", succeeded.to_string()),
    ];
    counter!(names::ENCODE_ATTEMPTS_TOTAL, &labels).increment(1);
    histogram!(names::ENCODE_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_upload_failure() {
    counter!(names::UPLOAD_FAILURES_TOTAL).increment(1);
}
