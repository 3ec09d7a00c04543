//! Prediction request and result models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CropFeatures;

/// A candidate harvest scenario submitted from the form.
///
/// Ranges mirror the limits of the input form; the model itself accepts any
/// municipality or crop name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "crate::validation::validate_request_temperature"))]
pub struct PredictionRequest {
    #[validate(range(min = 2005, max = 2100, message = "Year must be between 2005 and 2100"))]
    pub year: i32,

    #[validate(length(min = 1, message = "Municipality is required"))]
    pub municipality: String,

    #[validate(length(min = 1, message = "Crop is required"))]
    pub crop: String,

    #[validate(range(
        min = 0.1,
        max = 1_000_000.0,
        message = "Planted area must be between 0.1 and 1,000,000 ha"
    ))]
    pub planted_area_ha: f64,

    #[validate(range(
        min = 0.0,
        max = 10_000.0,
        message = "Precipitation must be between 0 and 10,000 mm"
    ))]
    pub precipitation_mm: f64,

    pub mean_temperature_c: f64,
}

impl CropFeatures for PredictionRequest {
    fn year(&self) -> i32 {
        self.year
    }

    fn municipality(&self) -> &str {
        &self.municipality
    }

    fn crop(&self) -> &str {
        &self.crop
    }

    fn planted_area_ha(&self) -> f64 {
        self.planted_area_ha
    }

    fn precipitation_mm(&self) -> f64 {
        self.precipitation_mm
    }

    fn mean_temperature_c(&self) -> f64 {
        self.mean_temperature_c
    }
}

impl From<FormDefaults> for PredictionRequest {
    fn from(defaults: FormDefaults) -> Self {
        Self {
            year: defaults.year,
            municipality: defaults.municipality,
            crop: defaults.crop,
            planted_area_ha: defaults.planted_area_ha,
            precipitation_mm: defaults.precipitation_mm,
            mean_temperature_c: defaults.mean_temperature_c,
        }
    }
}

/// Predicted yield and the production it implies for the requested area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub yield_kg_ha: f64,
    pub total_production_t: f64,
}

impl PredictionResult {
    pub fn new(yield_kg_ha: f64, planted_area_ha: f64) -> Self {
        Self {
            yield_kg_ha,
            total_production_t: total_production_t(yield_kg_ha, planted_area_ha),
        }
    }
}

/// Total production in tonnes for a yield (kg/ha) over an area (ha)
pub fn total_production_t(yield_kg_ha: f64, planted_area_ha: f64) -> f64 {
    yield_kg_ha * planted_area_ha / 1000.0
}

/// Categories the fitted model was trained on.
///
/// The form restricts its choices to these lists when they are available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVocabulary {
    pub municipalities: Vec<String>,
    pub crops: Vec<String>,
}

/// Initial values of the input form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    pub year: i32,
    pub municipality: String,
    pub crop: String,
    pub planted_area_ha: f64,
    pub precipitation_mm: f64,
    pub mean_temperature_c: f64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            year: 2024,
            municipality: "São Miguel do Oeste".to_string(),
            crop: "Soja".to_string(),
            planted_area_ha: 100.0,
            precipitation_mm: 1800.0,
            mean_temperature_c: 20.0,
        }
    }
}
