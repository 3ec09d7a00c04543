//! Random forest regressor
//!
//! Bagged CART trees fitted in parallel. Each tree owns an RNG stream derived
//! from `(seed, tree index)`, so the fitted forest does not depend on how
//! rayon schedules the work.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{MaxFeatures, RegressionTree, TreeBuilder, TreeParams};
use crate::error::{ModelIntegrityError, PredictionError, TrainingError};

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    /// Draw a bootstrap sample per tree; otherwise every tree sees all rows
    pub bootstrap: bool,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 150,
            seed: 42,
            bootstrap: true,
            tree: TreeParams {
                max_features: MaxFeatures::All,
                ..TreeParams::default()
            },
        }
    }
}

/// A fitted ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    params: ForestParams,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> Result<Self, TrainingError> {
        if x.len() != y.len() {
            return Err(TrainingError::LengthMismatch {
                rows: x.len(),
                targets: y.len(),
            });
        }
        if x.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        let n_rows = x.len();
        let n_features = x[0].len();
        let builder = TreeBuilder::new(x, y, params.tree);

        let trees: Vec<RegressionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
                rng.set_stream(tree_idx as u64);

                let indices: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };

                builder.build(indices, &mut rng)
            })
            .collect();

        tracing::debug!(
            trees = trees.len(),
            features = n_features,
            mean_leaves = trees.iter().map(RegressionTree::n_leaves).sum::<usize>() as f64
                / trees.len().max(1) as f64,
            "Random forest fitted"
        );

        Ok(Self {
            n_features,
            params,
            trees,
        })
    }

    /// Mean of the individual tree predictions
    pub fn predict_one(&self, x: &[f64]) -> Result<f64, PredictionError> {
        if x.len() != self.n_features {
            return Err(PredictionError::FeatureWidth {
                expected: self.n_features,
                found: x.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(PredictionError::EmptyModel);
        }

        let sum: f64 = self.trees.iter().map(|t| t.predict_one(x)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PredictionError> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Structural check of a forest that was not produced by [`RandomForest::fit`]
    pub fn validate(&self) -> Result<(), ModelIntegrityError> {
        if self.trees.is_empty() {
            return Err(ModelIntegrityError::NoTrees);
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(idx, tree)| tree.validate(idx, self.n_features))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}
