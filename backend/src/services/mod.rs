//! Services for the PAM yield prediction backend

pub mod dataset;
pub mod model_store;
pub mod prediction;
pub mod recommendation;
pub mod registry;
pub mod training;

pub use dataset::Dataset;
pub use model_store::ModelStore;
pub use prediction::{predict, PredictionService, ScenarioResponse};
pub use recommendation::{rank_crops, rank_crops_with_window, RecommendationService};
pub use registry::{load_or_train, LoadedModel, ModelRegistry, ModelSource};
pub use training::{train, train_from_csv};
