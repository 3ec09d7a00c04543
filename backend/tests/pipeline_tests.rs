//! Feature pipeline tests
//!
//! - Unknown categories encode to an all-zero block
//! - Transform is pure and bit-identical across calls
//! - Numeric columns are standardized with the fitted statistics

mod common;

use pam_server::ml::FeaturePipeline;
use proptest::prelude::*;
use shared::HistoricalRecord;

use common::{record, synthetic_dataset};

fn municipality_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Chapecó".to_string()),
        Just("Xanxerê".to_string()),
        "[A-Z][a-z]{3,12}",
    ]
}

fn crop_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Milho".to_string()),
        Just("Soja".to_string()),
        "[A-Z][a-z]{3,10}",
    ]
}

fn row_strategy() -> impl Strategy<Value = HistoricalRecord> {
    (
        2005i32..2100,
        municipality_strategy(),
        crop_strategy(),
        0.1f64..1_000_000.0,
        0.0f64..10_000.0,
        -10.0f64..50.0,
    )
        .prop_map(|(year, municipality, crop, area, precipitation, temperature)| {
            HistoricalRecord {
                year,
                municipality,
                crop,
                planted_area_ha: area,
                precipitation_mm: precipitation,
                mean_temperature_c: temperature,
                yield_kg_ha: 0.0,
            }
        })
}

#[test]
fn output_columns_follow_fixed_layout() {
    let pipeline = FeaturePipeline::fit(synthetic_dataset().records()).unwrap();
    assert_eq!(
        pipeline.feature_names(),
        vec![
            "year",
            "planted_area_ha",
            "precipitation_mm",
            "mean_temperature_c",
            "municipality=Chapecó",
            "municipality=Concórdia",
            "municipality=Xanxerê",
            "crop=Feijão",
            "crop=Milho",
            "crop=Soja",
        ]
    );
}

#[test]
fn unknown_categories_produce_zero_blocks() {
    let pipeline = FeaturePipeline::fit(synthetic_dataset().records()).unwrap();
    let row = record(2024, "UnknownTown", "Mandioca", 100.0, 0.0);
    let x = pipeline.transform_one(&row);

    assert_eq!(x.len(), pipeline.n_features());
    assert!(x[4..].iter().all(|v| *v == 0.0));
    assert!(x[..4].iter().all(|v| v.is_finite()));
}

#[test]
fn constant_column_is_not_divided_by_zero() {
    let rows = vec![
        record(2020, "Chapecó", "Soja", 100.0, 3000.0),
        record(2020, "Chapecó", "Soja", 100.0, 3100.0),
    ];
    let pipeline = FeaturePipeline::fit(&rows).unwrap();
    assert!(pipeline.numeric_scales().iter().all(|s| s.scale == 1.0));
    assert_eq!(pipeline.transform_one(&rows[0]), vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
}

proptest! {
    /// Transforming twice yields bit-identical rows
    #[test]
    fn transform_is_deterministic(row in row_strategy()) {
        let pipeline = FeaturePipeline::fit(synthetic_dataset().records()).unwrap();
        let a = pipeline.transform_one(&row);
        let b = pipeline.transform_one(&row);
        prop_assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    /// Each categorical block has at most one hot entry, exactly one when known
    #[test]
    fn categorical_blocks_are_one_hot(row in row_strategy()) {
        let pipeline = FeaturePipeline::fit(synthetic_dataset().records()).unwrap();
        let vocabulary = pipeline.vocabulary();
        let x = pipeline.transform_one(&row);

        let muni_end = 4 + vocabulary.municipalities.len();
        let muni_hot: f64 = x[4..muni_end].iter().sum();
        let crop_hot: f64 = x[muni_end..].iter().sum();

        let known_muni = vocabulary.municipalities.contains(&row.municipality);
        let known_crop = vocabulary.crops.contains(&row.crop);
        prop_assert_eq!(muni_hot, if known_muni { 1.0 } else { 0.0 });
        prop_assert_eq!(crop_hot, if known_crop { 1.0 } else { 0.0 });
    }

    /// Standardized training columns have zero mean
    #[test]
    fn fitted_columns_are_centered(rows in prop::collection::vec(row_strategy(), 2..40)) {
        let pipeline = FeaturePipeline::fit(&rows).unwrap();
        let x = pipeline.transform(&rows);
        for col in 0..4 {
            let mean: f64 = x.iter().map(|r| r[col]).sum::<f64>() / x.len() as f64;
            prop_assert!(mean.abs() < 1e-6, "column {} mean {}", col, mean);
        }
    }
}
