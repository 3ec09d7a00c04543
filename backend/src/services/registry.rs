//! Process-wide model registry
//!
//! The model is resolved lazily and at most once: the first caller loads a
//! persisted model or trains a new one while concurrent callers wait for the
//! same result. [`ModelRegistry::retrain`] replaces the held model wholesale;
//! callers that already hold an `Arc` keep using the previous one.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OnceCell, RwLock};

use super::dataset::Dataset;
use super::model_store::ModelStore;
use super::training::{persist_best_effort, train};
use crate::config::ModelConfig;
use crate::error::{ModelLoadError, TrainingError};
use crate::ml::FittedModel;

/// How the current model was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    /// Read from a model file
    Loaded { path: PathBuf },
    /// Fitted in this process; `persisted_to` is unset when saving failed
    Trained { persisted_to: Option<PathBuf> },
}

impl ModelSource {
    pub fn label(&self) -> &'static str {
        match self {
            ModelSource::Loaded { .. } => "loaded",
            ModelSource::Trained { .. } => "trained",
        }
    }
}

/// A fitted model with its provenance
#[derive(Debug)]
pub struct LoadedModel {
    pub model: FittedModel,
    pub source: ModelSource,
}

/// Resolve a model: `load_path`, then `save_path`, then train on `dataset`.
///
/// Unusable model files are logged and skipped. A freshly trained model is
/// persisted to `save_path` best-effort.
pub fn load_or_train(dataset: &Dataset, config: &ModelConfig) -> Result<LoadedModel, TrainingError> {
    let mut candidates = vec![config.load_path.clone()];
    if config.save_path != config.load_path {
        candidates.push(config.save_path.clone());
    }

    for path in candidates {
        match ModelStore::new(&path).load() {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    trees = model.forest().n_trees(),
                    trained_rows = model.trained_rows(),
                    "Loaded persisted model"
                );
                return Ok(LoadedModel {
                    model,
                    source: ModelSource::Loaded { path },
                });
            }
            Err(ModelLoadError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "No persisted model");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unusable model file");
            }
        }
    }

    train_and_persist(dataset, config)
}

fn train_and_persist(dataset: &Dataset, config: &ModelConfig) -> Result<LoadedModel, TrainingError> {
    let model = train(dataset, config.forest_params())?;
    let persisted_to = persist_best_effort(&ModelStore::new(&config.save_path), &model)
        .ok()
        .map(|_| config.save_path.clone());

    Ok(LoadedModel {
        model,
        source: ModelSource::Trained { persisted_to },
    })
}

/// Lazily initialized, explicitly replaceable model holder
pub struct ModelRegistry {
    dataset: Arc<Dataset>,
    config: ModelConfig,
    initial: OnceCell<Arc<LoadedModel>>,
    replaced: RwLock<Option<Arc<LoadedModel>>>,
    retrain_lock: Mutex<()>,
    training_runs: AtomicUsize,
}

impl ModelRegistry {
    pub fn new(dataset: Arc<Dataset>, config: ModelConfig) -> Self {
        Self {
            dataset,
            config,
            initial: OnceCell::new(),
            replaced: RwLock::new(None),
            retrain_lock: Mutex::new(()),
            training_runs: AtomicUsize::new(0),
        }
    }

    /// The current model, resolving it on first use.
    ///
    /// A failed initialization is not cached; the next caller tries again.
    pub async fn get_or_init(&self) -> Result<Arc<LoadedModel>, TrainingError> {
        if let Some(model) = self.replaced.read().await.as_ref() {
            return Ok(Arc::clone(model));
        }

        let model = self
            .initial
            .get_or_try_init(|| async {
                let dataset = Arc::clone(&self.dataset);
                let config = self.config.clone();
                let loaded = run_blocking(move || load_or_train(&dataset, &config)).await?;
                self.record(&loaded);
                Ok::<_, TrainingError>(Arc::new(loaded))
            })
            .await?;

        Ok(Arc::clone(model))
    }

    /// Train a new model from the dataset and make it current
    pub async fn retrain(&self) -> Result<Arc<LoadedModel>, TrainingError> {
        let _guard = self.retrain_lock.lock().await;

        let dataset = Arc::clone(&self.dataset);
        let config = self.config.clone();
        let loaded = Arc::new(run_blocking(move || train_and_persist(&dataset, &config)).await?);
        self.record(&loaded);

        *self.replaced.write().await = Some(Arc::clone(&loaded));
        tracing::info!(source = loaded.source.label(), "Model replaced");
        Ok(loaded)
    }

    /// The current model if one has been resolved, without triggering work
    pub async fn current(&self) -> Option<Arc<LoadedModel>> {
        if let Some(model) = self.replaced.read().await.as_ref() {
            return Some(Arc::clone(model));
        }
        self.initial.get().cloned()
    }

    pub async fn is_ready(&self) -> bool {
        self.current().await.is_some()
    }

    pub async fn source(&self) -> Option<ModelSource> {
        self.current().await.map(|m| m.source.clone())
    }

    /// How many times this registry has fitted a model
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::SeqCst)
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    fn record(&self, loaded: &LoadedModel) {
        if matches!(loaded.source, ModelSource::Trained { .. }) {
            self.training_runs.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn run_blocking<F>(work: F) -> Result<LoadedModel, TrainingError>
where
    F: FnOnce() -> Result<LoadedModel, TrainingError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| TrainingError::Task(e.to_string()))?
}
