//! Fitted preprocessing + regressor unit

use serde::{Deserialize, Serialize};
use shared::{CropFeatures, ModelVocabulary};

use super::{FeaturePipeline, ForestParams, RandomForest};
use crate::error::{ModelIntegrityError, PredictionError, TrainingError};

/// Feature pipeline and forest fitted together.
///
/// Never mutated after construction; retraining builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pipeline: FeaturePipeline,
    forest: RandomForest,
    trained_rows: usize,
}

impl FittedModel {
    /// Fit the pipeline on the feature columns, then the forest on the
    /// transformed rows and their targets.
    pub fn fit<R: CropFeatures>(
        rows: &[R],
        targets: &[f64],
        params: ForestParams,
    ) -> Result<Self, TrainingError> {
        if rows.len() != targets.len() {
            return Err(TrainingError::LengthMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }

        let pipeline = FeaturePipeline::fit(rows)?;
        let x = pipeline.transform(rows);
        let forest = RandomForest::fit(&x, targets, params)?;

        Ok(Self {
            pipeline,
            forest,
            trained_rows: rows.len(),
        })
    }

    /// Predicted yield (kg/ha) for one row
    pub fn predict_one<R: CropFeatures + ?Sized>(&self, row: &R) -> Result<f64, PredictionError> {
        let x = self.pipeline.transform_one(row);
        let prediction = self.forest.predict_one(&x)?;
        if !prediction.is_finite() {
            return Err(PredictionError::NonFinite(prediction));
        }
        Ok(prediction)
    }

    pub fn predict<R: CropFeatures>(&self, rows: &[R]) -> Result<Vec<f64>, PredictionError> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }

    /// Check that the pipeline and forest agree and every tree is walkable
    pub fn validate(&self) -> Result<(), ModelIntegrityError> {
        let (pipeline, forest) = (self.pipeline.n_features(), self.forest.n_features());
        if pipeline != forest {
            return Err(ModelIntegrityError::WidthMismatch { pipeline, forest });
        }
        self.forest.validate()
    }

    pub fn vocabulary(&self) -> ModelVocabulary {
        self.pipeline.vocabulary()
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn trained_rows(&self) -> usize {
        self.trained_rows
    }
}
