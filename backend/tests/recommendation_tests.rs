//! Crop recommendation tests
//!
//! - Ranking by mean yield for a municipality
//! - Global fallback when the municipality has no history in the window
//! - Only rows inside the year window contribute

mod common;

use pam_server::services::{rank_crops, rank_crops_with_window, Dataset};
use proptest::prelude::*;
use shared::{RankingScope, YearWindow};

use common::{record, synthetic_dataset};

#[test]
fn chapeco_scenario() {
    let dataset = Dataset::new(vec![
        record(2020, "Chapecó", "Soja", 100.0, 3000.0),
        record(2021, "Chapecó", "Soja", 100.0, 3400.0),
        record(2020, "Chapecó", "Milho", 100.0, 6400.0),
    ]);
    let ranking = rank_crops("Chapecó", 2021, &dataset);
    assert_eq!(ranking.pairs(), vec![("Milho", 6400.0), ("Soja", 3200.0)]);
    assert_eq!(ranking.scope, RankingScope::Municipality);
}

#[test]
fn unknown_town_falls_back_to_global_ranking() {
    let ranking = rank_crops("UnknownTown", 2024, &synthetic_dataset());
    assert_eq!(ranking.scope, RankingScope::Global);
    assert!(!ranking.is_empty());
    assert_eq!(ranking.crops.len(), 3);
    assert_eq!(ranking.crops[0].crop, "Milho");
}

#[test]
fn reference_year_outside_history_falls_back_to_global() {
    let ranking = rank_crops("Chapecó", 2050, &synthetic_dataset());
    assert_eq!(ranking.window, YearWindow { start: 2045, end: 2050 });
    assert_eq!(ranking.scope, RankingScope::Global);
}

#[test]
fn window_covers_six_seasons() {
    let dataset = Dataset::new(
        (2010..=2024)
            .map(|year| record(year, "Chapecó", "Soja", 100.0, f64::from(year)))
            .collect(),
    );
    let ranking = rank_crops("Chapecó", 2024, &dataset);
    assert_eq!(ranking.window, YearWindow { start: 2019, end: 2024 });
    // Mean of 2019..=2024
    assert_eq!(ranking.pairs(), vec![("Soja", 2021.5)]);
}

#[test]
fn top_three_is_a_prefix_of_full_ranking() {
    let dataset = synthetic_dataset();
    let full = rank_crops("Concórdia", 2024, &dataset);
    let top = full.clone().top(3);
    assert_eq!(&full.crops[..top.crops.len()], &top.crops[..]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Rankings are sorted descending, and each mean comes from rows inside
    /// the window when the scope is local
    #[test]
    fn ranking_is_sorted_and_windowed(
        rows in prop::collection::vec(
            (2005i32..2025, 0usize..3, 0usize..4, 500.0f64..9000.0),
            1..80,
        ),
        reference_year in 2005i32..2030,
        window_years in 0i32..8,
    ) {
        let municipalities = ["Chapecó", "Concórdia", "Xanxerê"];
        let crops = ["Feijão", "Milho", "Soja", "Trigo"];
        let dataset = Dataset::new(
            rows.iter()
                .map(|&(year, m, c, y)| record(year, municipalities[m], crops[c], 100.0, y))
                .collect(),
        );

        let ranking = rank_crops_with_window("Chapecó", reference_year, &dataset, window_years);

        prop_assert!(ranking
            .crops
            .windows(2)
            .all(|w| w[0].mean_yield_kg_ha > w[1].mean_yield_kg_ha
                || (w[0].mean_yield_kg_ha == w[1].mean_yield_kg_ha && w[0].crop < w[1].crop)));

        let min_year = dataset.min_year().unwrap();
        prop_assert_eq!(ranking.window.start, min_year.max(reference_year - window_years));
        prop_assert_eq!(ranking.window.end, reference_year);

        if ranking.scope == RankingScope::Municipality {
            for ranked in &ranking.crops {
                let yields: Vec<f64> = dataset
                    .records()
                    .iter()
                    .filter(|r| r.municipality == "Chapecó"
                        && r.crop == ranked.crop
                        && ranking.window.contains(r.year))
                    .map(|r| r.yield_kg_ha)
                    .collect();
                prop_assert!(!yields.is_empty());
                let mean = yields.iter().sum::<f64>() / yields.len() as f64;
                prop_assert!((mean - ranked.mean_yield_kg_ha).abs() < 1e-9);
            }
        }
    }
}
