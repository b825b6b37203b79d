//! clinai-web library - Readmission risk decision support service
//!
//! Serves the patient form, runs one assessment per "Analyze" action and
//! hands back the result page or the downloadable report.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use clinai_common::AppContext;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Largest accepted request body; a patient form is well under 1 KB
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Schema and scoring oracle, loaded once at startup (read-only)
    pub context: Arc<AppContext>,
}

impl AppState {
    /// Create new application state
    pub fn new(context: AppContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.css", get(api::serve_app_css))
        .route("/analyze", post(api::analyze_form))
        .route("/api/analyze", post(api::analyze_json))
        .route("/api/report", post(api::download_report))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
