//! Feature pipeline: numeric standardization and one-hot encoding
//!
//! Output layout is fixed at fit time:
//! `[year, planted_area_ha, precipitation_mm, mean_temperature_c,
//!   municipality=<sorted vocabulary>..., crop=<sorted vocabulary>...]`

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::{CropFeatures, ModelVocabulary};

use crate::error::TrainingError;

/// Numeric input columns, in output order
pub const NUMERIC_FEATURES: [&str; 4] = [
    "year",
    "planted_area_ha",
    "precipitation_mm",
    "mean_temperature_c",
];

/// Categorical input columns, in output order
pub const CATEGORICAL_FEATURES: [&str; 2] = ["municipality", "crop"];

fn numeric_values<R: CropFeatures + ?Sized>(row: &R) -> [f64; 4] {
    [
        f64::from(row.year()),
        row.planted_area_ha(),
        row.precipitation_mm(),
        row.mean_temperature_c(),
    ]
}

/// Learned mean and scale of one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScale {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScale {
    /// Fit on a column using the population standard deviation.
    ///
    /// A constant column gets a scale of 1.0.
    fn fit(values: impl Iterator<Item = f64> + Clone) -> Self {
        let (count, sum) = values.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
        let mean = sum / count as f64;
        let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std_dev = variance.sqrt();
        let scale = if std_dev < f64::EPSILON { 1.0 } else { std_dev };
        Self { mean, scale }
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Sorted vocabulary of one categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotVocabulary {
    categories: Vec<String>,
}

impl OneHotVocabulary {
    fn fit<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let categories: BTreeSet<&str> = values.collect();
        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Position of a category, `None` when it was never seen at fit time
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    /// Write the indicator block into `out`; unknown values leave it all zero
    fn encode_into(&self, value: &str, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.len());
        out.iter_mut().for_each(|v| *v = 0.0);
        if let Some(idx) = self.index_of(value) {
            out[idx] = 1.0;
        }
    }
}

/// Fitted preprocessing state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    numeric: Vec<StandardScale>,
    municipalities: OneHotVocabulary,
    crops: OneHotVocabulary,
}

impl FeaturePipeline {
    /// Learn column statistics and vocabularies
    pub fn fit<R: CropFeatures>(rows: &[R]) -> Result<Self, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        let numeric = (0..NUMERIC_FEATURES.len())
            .map(|col| StandardScale::fit(rows.iter().map(move |r| numeric_values(r)[col])))
            .collect();

        Ok(Self {
            numeric,
            municipalities: OneHotVocabulary::fit(rows.iter().map(|r| r.municipality())),
            crops: OneHotVocabulary::fit(rows.iter().map(|r| r.crop())),
        })
    }

    /// Width of every transformed row
    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.municipalities.len() + self.crops.len()
    }

    pub fn transform_one<R: CropFeatures + ?Sized>(&self, row: &R) -> Vec<f64> {
        let mut out = vec![0.0; self.n_features()];

        let values = numeric_values(row);
        for (slot, (scale, value)) in out.iter_mut().zip(self.numeric.iter().zip(values)) {
            *slot = scale.apply(value);
        }

        let muni_start = self.numeric.len();
        let crop_start = muni_start + self.municipalities.len();
        self.municipalities
            .encode_into(row.municipality(), &mut out[muni_start..crop_start]);
        self.crops.encode_into(row.crop(), &mut out[crop_start..]);

        out
    }

    pub fn transform<R: CropFeatures>(&self, rows: &[R]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_one(r)).collect()
    }

    /// Names of the output columns, in order
    pub fn feature_names(&self) -> Vec<String> {
        NUMERIC_FEATURES
            .iter()
            .map(|n| n.to_string())
            .chain(
                self.municipalities
                    .categories()
                    .iter()
                    .map(|c| format!("{}={}", CATEGORICAL_FEATURES[0], c)),
            )
            .chain(
                self.crops
                    .categories()
                    .iter()
                    .map(|c| format!("{}={}", CATEGORICAL_FEATURES[1], c)),
            )
            .collect()
    }

    pub fn numeric_scales(&self) -> &[StandardScale] {
        &self.numeric
    }

    pub fn vocabulary(&self) -> ModelVocabulary {
        ModelVocabulary {
            municipalities: self.municipalities.categories().to_vec(),
            crops: self.crops.categories().to_vec(),
        }
    }
}
