//! Yield model: feature pipeline and random forest regressor

pub mod features;
pub mod forest;
pub mod model;
pub mod tree;

pub use features::FeaturePipeline;
pub use forest::{ForestParams, RandomForest};
pub use model::FittedModel;
pub use tree::{MaxFeatures, TreeParams};
