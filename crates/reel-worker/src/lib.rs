//! Render orchestration.
//!
//! This crate provides:
//! - Worker configuration from the environment
//! - The mood catalog of background clips
//! - Per-job workspaces that are torn down exactly once
//! - The single-job orchestrator driving fetch, normalize, compose and encode
//! - The bounded-concurrency batch orchestrator
//! - Job logging and metrics

pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod metrics;
pub mod workspace;

pub use batch::{render_batch, JobRunner};
pub use catalog::MoodCatalog;
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use job::RenderOrchestrator;
pub use logging::{init_tracing, JobLogger};
pub use workspace::JobWorkspace;
