//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::ModelSource;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_ready: bool,
    pub model_source: Option<ModelSource>,
    pub dataset_rows: usize,
}

/// Health check endpoint handler. Never triggers model training.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_source = state.registry.source().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_ready: model_source.is_some(),
        model_source,
        dataset_rows: state.dataset.len(),
    })
}
