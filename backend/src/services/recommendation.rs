//! Historical crop ranking for a municipality

use std::collections::BTreeMap;
use std::sync::Arc;

use shared::{CropRanking, HistoricalRecord, RankedCrop, RankingScope, YearWindow};

use super::dataset::Dataset;
use crate::config::RecommendationConfig;

/// Years before the reference year included by default
pub const DEFAULT_WINDOW_YEARS: i32 = 5;

/// Rank crops by mean yield over the default window
pub fn rank_crops(municipality: &str, reference_year: i32, dataset: &Dataset) -> CropRanking {
    rank_crops_with_window(municipality, reference_year, dataset, DEFAULT_WINDOW_YEARS)
}

/// Rank crops by mean yield for `municipality` over
/// `[max(first year, reference_year - window_years), reference_year]`.
///
/// When no row matches, the whole dataset is ranked instead and the result
/// carries [`RankingScope::Global`].
pub fn rank_crops_with_window(
    municipality: &str,
    reference_year: i32,
    dataset: &Dataset,
    window_years: i32,
) -> CropRanking {
    let earliest = reference_year.saturating_sub(window_years.max(0));
    let window = YearWindow {
        start: dataset.min_year().map_or(earliest, |min| min.max(earliest)),
        end: reference_year,
    };

    let local: Vec<&HistoricalRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.municipality == municipality && window.contains(r.year))
        .collect();

    let (scope, crops) = if local.is_empty() {
        tracing::debug!(
            municipality,
            reference_year,
            "No local history in window, ranking whole dataset"
        );
        (RankingScope::Global, mean_yield_by_crop(dataset.records().iter()))
    } else {
        (RankingScope::Municipality, mean_yield_by_crop(local.into_iter()))
    };

    CropRanking {
        municipality: municipality.to_string(),
        reference_year,
        window,
        scope,
        crops,
    }
}

fn mean_yield_by_crop<'a>(records: impl Iterator<Item = &'a HistoricalRecord>) -> Vec<RankedCrop> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.crop.as_str()).or_insert((0.0, 0));
        entry.0 += record.yield_kg_ha;
        entry.1 += 1;
    }

    let mut ranked: Vec<RankedCrop> = totals
        .into_iter()
        .map(|(crop, (sum, count))| RankedCrop {
            crop: crop.to_string(),
            mean_yield_kg_ha: sum / count as f64,
        })
        .collect();

    // Stable sort keeps the alphabetical map order for equal means
    ranked.sort_by(|a, b| b.mean_yield_kg_ha.total_cmp(&a.mean_yield_kg_ha));
    ranked
}

/// Ranking bound to the loaded dataset and configured window
#[derive(Clone)]
pub struct RecommendationService {
    dataset: Arc<Dataset>,
    config: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(dataset: Arc<Dataset>, config: RecommendationConfig) -> Self {
        Self { dataset, config }
    }

    /// Full ranking
    pub fn rank(&self, municipality: &str, reference_year: i32) -> CropRanking {
        rank_crops_with_window(
            municipality,
            reference_year,
            &self.dataset,
            self.config.window_years,
        )
    }

    /// Ranking truncated to `limit`, or to the configured size
    pub fn top(&self, municipality: &str, reference_year: i32, limit: Option<usize>) -> CropRanking {
        self.rank(municipality, reference_year)
            .top(limit.unwrap_or(self.config.top_n))
    }
}
