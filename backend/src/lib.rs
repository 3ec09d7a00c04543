//! PAM crop yield prediction server
//!
//! Predicts crop yield (kg/ha) for a municipality scenario with a random
//! forest trained on historical PAM records, and ranks crops by their recent
//! historical yield.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod ml;
pub mod routes;
pub mod services;

pub use config::Config;

use services::{Dataset, ModelRegistry, PredictionService, RecommendationService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dataset: Arc<Dataset>,
    pub registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(config: Config, dataset: Dataset) -> Self {
        let dataset = Arc::new(dataset);
        let registry = Arc::new(ModelRegistry::new(
            Arc::clone(&dataset),
            config.model.clone(),
        ));
        Self {
            config: Arc::new(config),
            dataset,
            registry,
        }
    }

    pub fn recommendation_service(&self) -> RecommendationService {
        RecommendationService::new(
            Arc::clone(&self.dataset),
            self.config.recommendation.clone(),
        )
    }

    pub fn prediction_service(&self) -> PredictionService {
        PredictionService::new(Arc::clone(&self.registry), self.recommendation_service())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "PAM Crop Yield Prediction API v1"
}
