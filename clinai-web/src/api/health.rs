//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response: status, module name, version and loaded schema width
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub feature_columns: usize,
}

/// GET /health
///
/// The model and schema load before the listener binds, so a served request
/// means the oracle is ready.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "clinai-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        feature_columns: state.context.schema().len(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
