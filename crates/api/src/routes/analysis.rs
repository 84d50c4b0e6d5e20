//! Route definitions for the `/analyses` resource.
//!
//! ```text
//! GET    /                -> list_analyses
//! POST   /                -> submit_analysis (multipart video upload)
//! GET    /{id}            -> get_analysis
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(analysis::list_analyses).post(analysis::submit_analysis),
        )
        .route("/{id}", get(analysis::get_analysis))
}
