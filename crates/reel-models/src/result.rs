//! Render outcomes.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{EncodingStrategyKind, JobId, JobStage};

/// Outcome of one render job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderResult {
    pub job_id: JobId,
    /// Deliverable location (empty on failure)
    pub output_path: PathBuf,
    pub byte_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_strategy_used: Option<EncodingStrategyKind>,
    pub elapsed_seconds: f64,
    pub succeeded: bool,
    /// Human-readable failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Stable machine-readable failure category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<JobStage>,
    /// Object-storage key when the output was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl RenderResult {
    pub fn success(
        job_id: JobId,
        output_path: PathBuf,
        byte_size: u64,
        strategy: EncodingStrategyKind,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            job_id,
            output_path,
            byte_size,
            encoding_strategy_used: Some(strategy),
            elapsed_seconds,
            succeeded: true,
            error_detail: None,
            error_kind: None,
            failed_stage: None,
            storage_key: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failure(
        job_id: JobId,
        stage: JobStage,
        error_kind: impl Into<String>,
        error_detail: impl Into<String>,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            job_id,
            output_path: PathBuf::new(),
            byte_size: 0,
            encoding_strategy_used: None,
            elapsed_seconds,
            succeeded: false,
            error_detail: Some(error_detail.into()),
            error_kind: Some(error_kind.into()),
            failed_stage: Some(stage),
            storage_key: None,
            completed_at: Utc::now(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Per-job results in completion order
    pub results: Vec<RenderResult>,
    pub elapsed_seconds: f64,
}

impl BatchSummary {
    /// Summarize results collected in completion order.
    pub fn from_results(results: Vec<RenderResult>, elapsed_seconds: f64) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
            elapsed_seconds,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.succeeded > 0 && self.failed > 0
    }
}
