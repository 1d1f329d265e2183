//! Structured job logging.
//!
//! Every line a job emits carries its job ID and current stage, so one job's
//! history can be pulled out of interleaved batch output.

use reel_models::{JobId, JobStage};
use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `LOG_FORMAT=json` selects JSON lines; anything else gets coloured text.
/// `RUST_LOG` refines the filter on top of `default_directive`.
pub fn init_tracing(default_directive: &str) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    for directive in default_directive.split(',').filter(|d| !d.trim().is_empty()) {
        match directive.trim().parse() {
            Ok(d) => env_filter = env_filter.add_directive(d),
            Err(e) => eprintln!("ignoring log directive '{directive}': {e}"),
        }
    }

    let result = if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {e}");
    }
}

/// Job logger tagging every event with job ID, operation and stage.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
    stage: JobStage,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
            stage: JobStage::Created,
        }
    }

    /// Record the stage subsequent events belong to.
    pub fn set_stage(&mut self, stage: JobStage) {
        self.stage = stage;
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = stage.as_str(),
            "Stage entered"
        );
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = self.stage.as_str(),
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = self.stage.as_str(),
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = self.stage.as_str(),
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = self.stage.as_str(),
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = self.stage.as_str(),
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn stage(&self) -> JobStage {
        self.stage
    }

    /// Span wrapping the whole job; nested spans from the media crate inherit it.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_tracks_stage() {
        let job_id = JobId::from_string("job-1");
        let mut logger = JobLogger::new(&job_id, "render");
        assert_eq!(logger.job_id(), "job-1");
        assert_eq!(logger.stage(), JobStage::Created);

        logger.set_stage(JobStage::Fetching);
        assert_eq!(logger.stage(), JobStage::Fetching);
        logger.log_progress("narration fetched");
    }
}
