//! Error handling for the PAM yield prediction service
//!
//! Each concern has its own error type. Infrastructure failures (model
//! loading, persistence) are absorbed close to their cause; only
//! request-shaped failures reach the HTTP layer, with messages in English and
//! Portuguese.

use std::path::PathBuf;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FieldViolation;
use thiserror::Error;

/// The dataset lacks columns the model needs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Dataset is missing required column(s): {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

/// Failures while reading the historical dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset row at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        DatasetError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

/// Failures while fitting the model
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Cannot train on an empty dataset")]
    EmptyDataset,

    #[error("Feature matrix has {rows} rows but target has {targets} values")]
    LengthMismatch { rows: usize, targets: usize },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Training task failed: {0}")]
    Task(String),
}

/// A persisted model could not be used
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Model file {0} does not exist")]
    NotFound(PathBuf),

    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Model file {path} has format {found}, expected {expected}")]
    IncompatibleFormat {
        path: PathBuf,
        found: String,
        expected: String,
    },
}

/// A deserialized model whose parts do not fit together
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelIntegrityError {
    #[error("Pipeline produces {pipeline} features but the forest expects {forest}")]
    WidthMismatch { pipeline: usize, forest: usize },

    #[error("Forest has no trees")]
    NoTrees,

    #[error("Tree {tree} has no nodes")]
    EmptyTree { tree: usize },

    #[error("Tree {tree} node {node} has child index {child} outside ({node}, {len})")]
    InvalidChild {
        tree: usize,
        node: usize,
        child: usize,
        len: usize,
    },

    #[error("Tree {tree} node {node} splits on feature {feature} of {n_features}")]
    InvalidFeature {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },

    #[error("Tree {tree} node {node} holds a non-finite value")]
    NonFiniteValue { tree: usize, node: usize },
}

/// A freshly trained model could not be written to storage
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to write model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single request could not be answered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Expected {expected} features, got {found}")]
    FeatureWidth { expected: usize, found: usize },

    #[error("Model produced a non-finite prediction ({0})")]
    NonFinite(f64),

    #[error("Model is empty and cannot predict")]
    EmptyModel,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Model errors
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error("Model is not available: {0}")]
    ModelUnavailable(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_pt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: String, message_pt: String) -> Self {
        Self {
            code: code.to_string(),
            message_en,
            message_pt,
            field: None,
            violations: Vec::new(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Prediction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Training(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_detail = match &self {
            AppError::Validation(violations) => {
                let mut detail = ErrorDetail::new(
                    "VALIDATION_ERROR",
                    "One or more fields are out of range".to_string(),
                    "Um ou mais campos estão fora do intervalo permitido".to_string(),
                );
                detail.field = violations.first().map(|v| v.field.clone());
                detail.violations = violations.clone();
                detail
            }
            AppError::BadRequest(msg) => ErrorDetail::new(
                "BAD_REQUEST",
                msg.clone(),
                format!("Requisição inválida: {}", msg),
            ),
            AppError::Prediction(err) => ErrorDetail::new(
                "PREDICTION_ERROR",
                format!("Prediction failed: {}", err),
                "Ocorreu um erro ao realizar a predição. Verifique os dados de entrada."
                    .to_string(),
            ),
            AppError::Training(err) => ErrorDetail::new(
                "TRAINING_ERROR",
                format!("Model training failed: {}", err),
                format!("Falha ao treinar o modelo: {}", err),
            ),
            AppError::ModelUnavailable(msg) => ErrorDetail::new(
                "MODEL_UNAVAILABLE",
                format!("Model is not available: {}", msg),
                "O modelo não está disponível no momento".to_string(),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
