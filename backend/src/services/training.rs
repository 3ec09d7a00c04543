//! Training orchestration: dataset in, fitted model out

use std::path::Path;
use std::time::Instant;

use crate::error::{DatasetError, PersistError, TrainingError};
use crate::ml::{FittedModel, ForestParams};

use super::dataset::Dataset;
use super::model_store::ModelStore;

/// Fit a model on every record of the dataset
pub fn train(dataset: &Dataset, params: ForestParams) -> Result<FittedModel, TrainingError> {
    if dataset.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }

    tracing::info!(
        rows = dataset.len(),
        trees = params.n_trees,
        seed = params.seed,
        "Training random forest"
    );
    let started = Instant::now();

    let model = FittedModel::fit(dataset.records(), &dataset.targets(), params)?;

    tracing::info!(
        rows = model.trained_rows(),
        trees = model.forest().n_trees(),
        features = model.pipeline().n_features(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Training finished"
    );
    Ok(model)
}

/// Read a CSV and train on it
pub fn train_from_csv<P: AsRef<Path>>(
    path: P,
    params: ForestParams,
) -> Result<FittedModel, TrainingError> {
    let dataset = Dataset::load(path).map_err(|err| match err {
        DatasetError::Schema(schema) => TrainingError::Schema(schema),
        other => TrainingError::Dataset(other),
    })?;
    train(&dataset, params)
}

/// Persist a freshly trained model. Failure is logged and returned but never
/// invalidates the in-memory model.
pub fn persist_best_effort(store: &ModelStore, model: &FittedModel) -> Result<(), PersistError> {
    store.save(model).map_err(|err| {
        tracing::warn!(
            path = %store.path().display(),
            error = %err,
            "Could not persist trained model; continuing with in-memory model"
        );
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::HistoricalRecord;
    use std::io::Write;

    fn record(year: i32, crop: &str, yield_kg_ha: f64) -> HistoricalRecord {
        HistoricalRecord {
            year,
            municipality: "Chapecó".to_string(),
            crop: crop.to_string(),
            planted_area_ha: 100.0,
            precipitation_mm: 1800.0,
            mean_temperature_c: 20.0,
            yield_kg_ha,
        }
    }

    fn params() -> ForestParams {
        ForestParams {
            n_trees: 8,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_train_on_empty_dataset_fails() {
        assert!(matches!(
            train(&Dataset::default(), params()),
            Err(TrainingError::EmptyDataset)
        ));
    }

    #[test]
    fn test_train_separates_crops() {
        let dataset = Dataset::new(
            (2015..2024)
                .flat_map(|y| [record(y, "Milho", 6400.0), record(y, "Soja", 3200.0)])
                .collect(),
        );
        let model = train(&dataset, params()).unwrap();

        assert_eq!(model.trained_rows(), 18);
        let milho = model.predict_one(&record(2020, "Milho", 0.0)).unwrap();
        let soja = model.predict_one(&record(2020, "Soja", 0.0)).unwrap();
        assert!(milho > soja);
    }

    #[test]
    fn test_train_from_csv_reports_missing_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ano,municipio,cultura").unwrap();
        writeln!(file, "2020,Chapecó,Soja").unwrap();

        match train_from_csv(file.path(), params()) {
            Err(TrainingError::Schema(err)) => assert_eq!(err.missing.len(), 4),
            other => panic!("expected schema error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_persist_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let dataset = Dataset::new(vec![record(2020, "Soja", 3000.0), record(2021, "Soja", 3100.0)]);
        let model = train(&dataset, params()).unwrap();
        let store = ModelStore::new(blocker.join("model.json"));

        assert!(persist_best_effort(&store, &model).is_err());
    }
}
