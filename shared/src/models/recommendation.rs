//! Crop recommendation models

use serde::{Deserialize, Serialize};

/// A crop and its historical mean yield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCrop {
    pub crop: String,
    pub mean_yield_kg_ha: f64,
}

/// Inclusive span of years used to compute a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

/// Which rows a ranking was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingScope {
    /// Rows of the requested municipality inside the year window
    Municipality,
    /// No row matched; every row of the dataset was used
    Global,
}

/// Crops ordered by descending historical mean yield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRanking {
    pub municipality: String,
    pub reference_year: i32,
    pub window: YearWindow,
    pub scope: RankingScope,
    pub crops: Vec<RankedCrop>,
}

impl CropRanking {
    /// Keep only the best `n` crops
    pub fn top(mut self, n: usize) -> Self {
        self.crops.truncate(n);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    /// `(crop, mean yield)` pairs in ranking order
    pub fn pairs(&self) -> Vec<(&str, f64)> {
        self.crops
            .iter()
            .map(|c| (c.crop.as_str(), c.mean_yield_kg_ha))
            .collect()
    }
}
