//! Yield model tests
//!
//! - Same data, seed and tree count give identical predictions
//! - Predictions are finite for known and unknown categories
//! - Forest output stays within the range of the training targets

mod common;

use pam_server::ml::{FittedModel, ForestParams, RandomForest};
use pam_server::services::train;
use proptest::prelude::*;

use common::{request, synthetic_dataset};

fn params(n_trees: usize) -> ForestParams {
    ForestParams {
        n_trees,
        ..ForestParams::default()
    }
}

#[test]
fn two_trainings_give_identical_predictions() {
    let dataset = synthetic_dataset();
    let a = train(&dataset, params(25)).unwrap();
    let b = train(&dataset, params(25)).unwrap();

    for (m, c) in [("Chapecó", "Soja"), ("Xanxerê", "Milho"), ("UnknownTown", "Trigo")] {
        let row = request(m, c);
        assert_eq!(
            a.predict_one(&row).unwrap().to_bits(),
            b.predict_one(&row).unwrap().to_bits()
        );
    }
}

#[test]
fn known_categories_predict_finite_values() {
    let model = train(&synthetic_dataset(), params(30)).unwrap();
    let prediction = model.predict_one(&request("Chapecó", "Soja")).unwrap();
    assert!(prediction.is_finite());
    assert!(prediction > 0.0);
}

#[test]
fn crops_are_separated_by_the_model() {
    let model = train(&synthetic_dataset(), params(30)).unwrap();
    let milho = model.predict_one(&request("Chapecó", "Milho")).unwrap();
    let soja = model.predict_one(&request("Chapecó", "Soja")).unwrap();
    let feijao = model.predict_one(&request("Chapecó", "Feijão")).unwrap();
    assert!(milho > soja);
    assert!(soja > feijao);
}

#[test]
fn model_survives_json_round_trip() {
    let model = train(&synthetic_dataset(), params(5)).unwrap();
    let json = serde_json::to_string(&model).unwrap();
    let restored: FittedModel = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, model);
}

fn matrix_strategy() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<f64>)> {
    prop::collection::vec((prop::collection::vec(-100.0f64..100.0, 3), -1e4f64..1e4), 2..40)
        .prop_map(|rows| -> (Vec<Vec<f64>>, Vec<f64>) { rows.into_iter().unzip() })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The mean of leaf means never leaves the target range
    #[test]
    fn predictions_stay_within_target_range(
        (x, y) in matrix_strategy(),
        sample in prop::collection::vec(-200.0f64..200.0, 3),
        seed in any::<u64>(),
    ) {
        let forest = RandomForest::fit(&x, &y, ForestParams { seed, ..params(8) }).unwrap();
        let p = forest.predict_one(&sample).unwrap();
        let lo = y.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(p >= lo - 1e-6 && p <= hi + 1e-6, "{} not in [{}, {}]", p, lo, hi);
    }

    /// Refitting with the same seed reproduces the forest exactly
    #[test]
    fn same_seed_same_forest((x, y) in matrix_strategy(), seed in any::<u64>()) {
        let p = ForestParams { seed, ..params(6) };
        prop_assert_eq!(
            RandomForest::fit(&x, &y, p).unwrap(),
            RandomForest::fit(&x, &y, p).unwrap()
        );
    }
}
