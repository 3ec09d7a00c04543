//! Route definitions for the PAM yield prediction API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predictions", post(handlers::create_prediction))
        .route("/recommendations", get(handlers::list_recommendations))
        .nest("/model", model_routes())
}

/// Model metadata and lifecycle routes
fn model_routes() -> Router<AppState> {
    Router::new()
        .route("/vocabulary", get(handlers::model_vocabulary))
        .route("/defaults", get(handlers::form_defaults))
        .route("/retrain", post(handlers::retrain_model))
}
