//! Validation utilities for prediction requests
//!
//! The limits are the ones enforced by the input form. They are applied at the
//! service boundary; the prediction core itself accepts any value.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::PredictionRequest;
use crate::types::LocalizedMessage;

// ============================================================================
// Form limits
// ============================================================================

pub const YEAR_MIN: i32 = 2005;
pub const YEAR_MAX: i32 = 2100;
pub const PLANTED_AREA_MIN_HA: f64 = 0.1;
pub const PLANTED_AREA_MAX_HA: f64 = 1_000_000.0;
pub const MEAN_TEMPERATURE_MIN_C: f64 = -10.0;
pub const MEAN_TEMPERATURE_MAX_C: f64 = 50.0;
pub const PRECIPITATION_MIN_MM: f64 = 0.0;
pub const PRECIPITATION_MAX_MM: f64 = 10_000.0;

/// Schema-level check for the mean temperature range
pub fn validate_request_temperature(request: &PredictionRequest) -> Result<(), ValidationError> {
    let t = request.mean_temperature_c;
    if !t.is_finite() || t < MEAN_TEMPERATURE_MIN_C || t > MEAN_TEMPERATURE_MAX_C {
        let mut error = ValidationError::new("mean_temperature_c");
        error.message = Some("Mean temperature must be between -10 and 50 °C".into());
        return Err(error);
    }
    Ok(())
}

/// A single rejected field of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: LocalizedMessage,
}

/// Validate a prediction request against the form limits.
///
/// Violations are returned sorted by field name.
pub fn validate_prediction_request(request: &PredictionRequest) -> Result<(), Vec<FieldViolation>> {
    match request.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(violations_from(&errors)),
    }
}

/// Flatten `validator` errors into bilingual field violations
pub fn violations_from(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                // Schema-level errors are reported under "__all__" with the field as code
                if field == "__all__" {
                    e.code.to_string()
                } else {
                    field.to_string()
                }
            })
        })
        .map(|field| FieldViolation {
            message: field_message(&field),
            field,
        })
        .collect();

    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations.dedup();
    violations
}

/// Bilingual message describing the accepted range of a field
pub fn field_message(field: &str) -> LocalizedMessage {
    match field {
        "year" => LocalizedMessage::new(
            format!("Year must be between {} and {}", YEAR_MIN, YEAR_MAX),
            format!("O ano da safra deve estar entre {} e {}", YEAR_MIN, YEAR_MAX),
        ),
        "municipality" => LocalizedMessage::new(
            "Municipality is required",
            "O município é obrigatório",
        ),
        "crop" => LocalizedMessage::new("Crop is required", "A cultura agrícola é obrigatória"),
        "planted_area_ha" => LocalizedMessage::new(
            "Planted area must be between 0.1 and 1,000,000 ha",
            "A área plantada deve estar entre 0,1 e 1.000.000 ha",
        ),
        "precipitation_mm" => LocalizedMessage::new(
            "Precipitation must be between 0 and 10,000 mm",
            "A precipitação anual deve estar entre 0 e 10.000 mm",
        ),
        "mean_temperature_c" => LocalizedMessage::new(
            "Mean temperature must be between -10 and 50 °C",
            "A temperatura média anual deve estar entre -10 e 50 °C",
        ),
        other => LocalizedMessage::new(
            format!("Invalid value for {}", other),
            format!("Valor inválido para {}", other),
        ),
    }
}
