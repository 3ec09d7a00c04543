//! HTTP handlers for model metadata and retraining

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{FormDefaults, ModelVocabulary};

use crate::{
    error::{AppError, AppResult},
    services::ModelSource,
    AppState,
};

#[derive(Serialize)]
pub struct RetrainResponse {
    pub source: ModelSource,
    pub trained_rows: usize,
    pub trees: usize,
}

/// Municipalities and crops known to the model
pub async fn model_vocabulary(State(state): State<AppState>) -> AppResult<Json<ModelVocabulary>> {
    let loaded = state
        .registry
        .get_or_init()
        .await
        .map_err(|e| AppError::ModelUnavailable(e.to_string()))?;
    Ok(Json(loaded.model.vocabulary()))
}

/// Initial values of the scenario form
pub async fn form_defaults() -> Json<FormDefaults> {
    Json(FormDefaults::default())
}

/// Train a fresh model on the loaded dataset and make it current
pub async fn retrain_model(State(state): State<AppState>) -> AppResult<Json<RetrainResponse>> {
    let loaded = state.registry.retrain().await?;

    Ok(Json(RetrainResponse {
        source: loaded.source.clone(),
        trained_rows: loaded.model.trained_rows(),
        trees: loaded.model.forest().n_trees(),
    }))
}
