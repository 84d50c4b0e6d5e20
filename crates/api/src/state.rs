use std::sync::Arc;

use coverdrive_pipeline::engine::AnalysisEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// The analysis job orchestrator.
    pub engine: AnalysisEngine,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
