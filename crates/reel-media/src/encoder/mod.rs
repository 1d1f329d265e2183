//! Fallback Encoder.
//!
//! Encoders fail in ways that are hard to predict from the inputs: a codec
//! rejects a bitrate, a build lacks a filter, the audio track silently fails
//! to negotiate. The encoder walks an ordered ladder of strategies and keeps
//! the first output that actually exists, is non-empty and passes the
//! strategy's own acceptance check.

mod diagnostics;
mod strategy;

pub use diagnostics::{confirm_audio_stream_present, excerpt};
pub use strategy::{default_strategies, Conservative, DirectMux, EncodeStrategy, Minimal};

use reel_models::{EncodingConfig, EncodingStrategyKind, Timeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::command::ProcessRunner;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{non_empty_file_size, remove_if_exists};

/// Diagnostic lines carried into an `EncodingFailed` error.
const FAILURE_EXCERPT_LINES: usize = 20;

/// Report of one strategy attempt.
#[derive(Debug, Clone)]
pub struct EncodeAttempt {
    pub strategy: EncodingStrategyKind,
    pub succeeded: bool,
    pub exit_code: Option<i32>,
    /// Why the attempt was rejected
    pub failure: Option<String>,
    /// Diagnostics of the last pass that ran
    pub diagnostics: String,
    pub elapsed_secs: f64,
}

/// A successful encode.
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub strategy: EncodingStrategyKind,
    pub output_path: PathBuf,
    pub byte_size: u64,
    /// Every attempt made, the successful one last
    pub attempts: Vec<EncodeAttempt>,
}

/// Runs strategies in order until one produces an acceptable file.
pub struct FallbackEncoder {
    strategies: Vec<Box<dyn EncodeStrategy>>,
    runner: Arc<dyn ProcessRunner>,
    config: EncodingConfig,
}

impl FallbackEncoder {
    pub fn new(strategies: Vec<Box<dyn EncodeStrategy>>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            strategies,
            runner,
            config: EncodingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EncodingConfig) -> Self {
        self.config = config;
        self
    }

    /// Encode `timeline` to `output`.
    ///
    /// Returns `EncodingFailed` with the last diagnostics when every strategy
    /// has been tried. No partial file is left at `output` on failure.
    pub async fn encode(&self, timeline: &Timeline, output: &Path) -> MediaResult<EncodeOutcome> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let attempt = self.attempt(strategy.as_ref(), timeline, output).await;

            if attempt.succeeded {
                let byte_size = non_empty_file_size(output).await?;
                info!(
                    strategy = attempt.strategy.as_str(),
                    attempts = attempts.len() + 1,
                    bytes = byte_size,
                    elapsed_secs = attempt.elapsed_secs,
                    "encode succeeded"
                );
                let strategy = attempt.strategy;
                attempts.push(attempt);
                return Ok(EncodeOutcome {
                    strategy,
                    output_path: output.to_path_buf(),
                    byte_size,
                    attempts,
                });
            }

            warn!(
                strategy = attempt.strategy.as_str(),
                exit_code = ?attempt.exit_code,
                reason = attempt.failure.as_deref().unwrap_or("unknown"),
                "encode attempt failed, trying next strategy"
            );
            attempts.push(attempt);
        }

        let detail = match attempts.last() {
            Some(last) => {
                let reason = last.failure.clone().unwrap_or_default();
                let tail = excerpt(&last.diagnostics, FAILURE_EXCERPT_LINES);
                if tail.is_empty() {
                    format!("{}: {reason}", last.strategy)
                } else {
                    format!("{}: {reason}\n{tail}", last.strategy)
                }
            }
            None => "no encoding strategies configured".to_string(),
        };

        Err(MediaError::EncodingFailed {
            attempts: attempts.len(),
            detail,
        })
    }

    async fn attempt(&self, strategy: &dyn EncodeStrategy, timeline: &Timeline, output: &Path) -> EncodeAttempt {
        let started = Instant::now();
        let plan = strategy.plan(timeline, &self.config, output);
        let intermediates: Vec<PathBuf> = plan
            .iter()
            .map(|cmd| cmd.output_path().to_path_buf())
            .filter(|p| p != output)
            .collect();

        let mut attempt = EncodeAttempt {
            strategy: strategy.kind(),
            succeeded: false,
            exit_code: None,
            failure: None,
            diagnostics: String::new(),
            elapsed_secs: 0.0,
        };

        for (pass, cmd) in plan.iter().enumerate() {
            match self.runner.run(cmd).await {
                Ok(result) => {
                    attempt.exit_code = result.exit_code;
                    attempt.diagnostics = result.diagnostics;
                    if !result.success {
                        attempt.failure = Some(format!("pass {} exited with {:?}", pass + 1, result.exit_code));
                        break;
                    }
                }
                Err(e) => {
                    attempt.failure = Some(format!("pass {}: {e}", pass + 1));
                    break;
                }
            }
        }

        if attempt.failure.is_none() {
            attempt.failure = match non_empty_file_size(output).await {
                Ok(_) => strategy.accept(&attempt.diagnostics).err(),
                Err(e) => Some(format!("no usable output: {e}")),
            };
        }

        for path in &intermediates {
            remove_if_exists(path).await;
        }

        attempt.succeeded = attempt.failure.is_none();
        if !attempt.succeeded {
            remove_if_exists(output).await;
        }
        attempt.elapsed_secs = started.elapsed().as_secs_f64();
        attempt
    }
}
