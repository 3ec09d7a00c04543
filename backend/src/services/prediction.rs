//! Yield prediction for a single scenario

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{validate_prediction_request, CropRanking, PredictionRequest, PredictionResult};

use super::recommendation::RecommendationService;
use super::registry::ModelRegistry;
use crate::error::{AppError, AppResult, PredictionError};
use crate::ml::FittedModel;

/// Predicted yield for `request` and the production over its planted area.
///
/// Negative model outputs are returned as-is.
pub fn predict(model: &FittedModel, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
    let yield_kg_ha = model.predict_one(request)?;
    Ok(PredictionResult::new(yield_kg_ha, request.planted_area_ha))
}

/// Prediction together with the historical ranking for the same place and year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResponse {
    pub prediction: PredictionResult,
    pub recommendations: CropRanking,
}

pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    recommendations: RecommendationService,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>, recommendations: RecommendationService) -> Self {
        Self {
            registry,
            recommendations,
        }
    }

    /// Validate, predict and rank
    pub async fn evaluate(&self, request: PredictionRequest) -> AppResult<ScenarioResponse> {
        validate_prediction_request(&request).map_err(AppError::Validation)?;

        let loaded = self
            .registry
            .get_or_init()
            .await
            .map_err(|e| AppError::ModelUnavailable(e.to_string()))?;

        let prediction = predict(&loaded.model, &request)?;
        tracing::debug!(
            municipality = %request.municipality,
            crop = %request.crop,
            year = request.year,
            yield_kg_ha = prediction.yield_kg_ha,
            "Scenario evaluated"
        );

        let recommendations = self
            .recommendations
            .top(&request.municipality, request.year, None);

        Ok(ScenarioResponse {
            prediction,
            recommendations,
        })
    }
}
