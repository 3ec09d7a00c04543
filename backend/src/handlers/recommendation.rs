//! HTTP handlers for historical crop recommendations

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{CropRanking, FormDefaults};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub municipality: String,
    /// Reference year; defaults to the latest year in the dataset
    pub year: Option<i32>,
    /// Number of crops; defaults to the configured size
    pub limit: Option<usize>,
}

/// Rank crops by historical mean yield
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<CropRanking>> {
    let municipality = query.municipality.trim();
    if municipality.is_empty() {
        return Err(AppError::BadRequest("municipality is required".to_string()));
    }

    let year = query
        .year
        .or_else(|| state.dataset.max_year())
        .unwrap_or_else(|| FormDefaults::default().year);

    let ranking = state
        .recommendation_service()
        .top(municipality, year, query.limit);
    Ok(Json(ranking))
}
