//! HTTP handlers for yield prediction

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use shared::PredictionRequest;

use crate::{error::AppResult, services::ScenarioResponse, AppState};

/// Predict the yield of a scenario and rank crops for its municipality
pub async fn create_prediction(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Json<ScenarioResponse>> {
    let Json(input) = payload?;
    let service = state.prediction_service();
    let response = service.evaluate(input).await?;
    Ok(Json(response))
}
