//! Job identifiers and the single-job stage machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a render job.
///
/// Also names the job's private temporary-file namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of a single render job.
///
/// ```text
/// Created -> Fetching -> Verifying -> Normalizing -> Composing -> Encoding
///                                                                 |
///                                              Succeeded | Failed -> CleanedUp
/// ```
///
/// `Failed` is reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    #[default]
    Created,
    Fetching,
    Verifying,
    Normalizing,
    Composing,
    Encoding,
    Succeeded,
    Failed,
    CleanedUp,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Created => "created",
            JobStage::Fetching => "fetching",
            JobStage::Verifying => "verifying",
            JobStage::Normalizing => "normalizing",
            JobStage::Composing => "composing",
            JobStage::Encoding => "encoding",
            JobStage::Succeeded => "succeeded",
            JobStage::Failed => "failed",
            JobStage::CleanedUp => "cleaned_up",
        }
    }

    /// The stage that follows this one on the happy path.
    pub fn next(&self) -> Option<JobStage> {
        match self {
            JobStage::Created => Some(JobStage::Fetching),
            JobStage::Fetching => Some(JobStage::Verifying),
            JobStage::Verifying => Some(JobStage::Normalizing),
            JobStage::Normalizing => Some(JobStage::Composing),
            JobStage::Composing => Some(JobStage::Encoding),
            JobStage::Encoding => Some(JobStage::Succeeded),
            JobStage::Succeeded | JobStage::Failed => Some(JobStage::CleanedUp),
            JobStage::CleanedUp => None,
        }
    }

    /// Whether the job has finished its work (successfully or not).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStage::Succeeded | JobStage::Failed | JobStage::CleanedUp
        )
    }

    /// Check whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(&self, to: JobStage) -> bool {
        if to == JobStage::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: [JobStage; 6] = [
        JobStage::Created,
        JobStage::Fetching,
        JobStage::Verifying,
        JobStage::Normalizing,
        JobStage::Composing,
        JobStage::Encoding,
    ];

    #[test]
    fn test_job_id_unique() {
        assert_ne!(JobId::new(), JobId::new());
        assert_eq!(JobId::from_string("abc").as_str(), "abc");
    }

    #[test]
    fn test_failed_reachable_from_every_working_stage() {
        for stage in PIPELINE {
            assert!(stage.can_transition_to(JobStage::Failed), "{stage}");
        }
        assert!(!JobStage::Succeeded.can_transition_to(JobStage::Failed));
        assert!(!JobStage::CleanedUp.can_transition_to(JobStage::Failed));
    }

    #[test]
    fn test_happy_path_is_linear() {
        let mut stage = JobStage::Created;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(stage.can_transition_to(next));
            stage = next;
            seen.push(stage);
        }
        assert_eq!(seen.len(), 8);
        assert_eq!(stage, JobStage::CleanedUp);
        assert!(!JobStage::Fetching.can_transition_to(JobStage::Encoding));
    }

    #[test]
    fn test_both_outcomes_clean_up() {
        assert!(JobStage::Succeeded.can_transition_to(JobStage::CleanedUp));
        assert!(JobStage::Failed.can_transition_to(JobStage::CleanedUp));
        assert!(!JobStage::Encoding.can_transition_to(JobStage::CleanedUp));
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&JobStage::CleanedUp).unwrap();
        assert_eq!(json, "\"cleaned_up\"");
    }
}
