//! Model storage: a single JSON file per fitted model

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelLoadError, PersistError};
use crate::ml::FittedModel;

/// Identifier written into every model file
pub const MODEL_FORMAT: &str = "pam-yield-model";
/// Bumped whenever the serialized layout of [`FittedModel`] changes
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ModelFileRef<'a> {
    format: &'a str,
    version: u32,
    trained_at: DateTime<Utc>,
    model: &'a FittedModel,
}

#[derive(Deserialize)]
struct ModelFile {
    model: FittedModel,
}

/// Reads and writes a fitted model at a fixed path
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<FittedModel, ModelLoadError> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ModelLoadError::NotFound(self.path.clone()),
            _ => ModelLoadError::Io {
                path: self.path.clone(),
                source,
            },
        })?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e))?;

        let format = value.get("format").and_then(Value::as_str).unwrap_or("");
        let version = value.get("version").and_then(Value::as_u64);
        if format != MODEL_FORMAT || version != Some(u64::from(MODEL_FORMAT_VERSION)) {
            return Err(ModelLoadError::IncompatibleFormat {
                path: self.path.clone(),
                found: format!(
                    "{} v{}",
                    if format.is_empty() { "<none>" } else { format },
                    version.map(|v| v.to_string()).unwrap_or_else(|| "?".into())
                ),
                expected: format!("{} v{}", MODEL_FORMAT, MODEL_FORMAT_VERSION),
            });
        }

        let file: ModelFile = serde_json::from_value(value).map_err(|e| self.corrupt(e))?;
        file.model.validate().map_err(|err| ModelLoadError::Corrupt {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        Ok(file.model)
    }

    /// Write the model atomically: temporary sibling file, then rename
    pub fn save(&self, model: &FittedModel) -> Result<(), PersistError> {
        let io_err = |source: std::io::Error| PersistError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let payload = serde_json::to_vec(&ModelFileRef {
            format: MODEL_FORMAT,
            version: MODEL_FORMAT_VERSION,
            trained_at: Utc::now(),
            model,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, payload).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            io_err(source)
        })?;

        tracing::info!(path = %self.path.display(), "Model saved");
        Ok(())
    }

    fn corrupt(&self, err: serde_json::Error) -> ModelLoadError {
        ModelLoadError::Corrupt {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}
