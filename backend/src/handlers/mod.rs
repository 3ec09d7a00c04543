//! HTTP handlers

pub mod health;
pub mod model;
pub mod prediction;
pub mod recommendation;

pub use health::health_check;
pub use model::{form_defaults, model_vocabulary, retrain_model};
pub use prediction::create_prediction;
pub use recommendation::list_recommendations;
