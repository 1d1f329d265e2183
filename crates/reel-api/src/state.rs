//! Application state.

use std::sync::Arc;

use reel_worker::RenderOrchestrator;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: Arc<RenderOrchestrator>,
}

impl AppState {
    pub fn new(config: ApiConfig, orchestrator: RenderOrchestrator) -> Self {
        Self {
            config,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
