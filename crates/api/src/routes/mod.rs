//! Route registration for the API server.

use axum::Router;

use crate::state::AppState;

pub mod analysis;
pub mod health;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/analyses", analysis::router())
}
