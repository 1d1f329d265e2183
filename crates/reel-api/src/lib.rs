//! Axum HTTP API server.
//!
//! This crate provides:
//! - Single and batch render endpoints over the worker orchestrator
//! - Health and Prometheus metrics endpoints
//! - Request ID, logging and CORS middleware

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
