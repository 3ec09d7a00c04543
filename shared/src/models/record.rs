//! Historical crop observations

use serde::{Deserialize, Serialize};

/// One observation of a crop in a municipality for a given year.
///
/// Field names on the wire follow the column headers of the PAM dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "cultura")]
    pub crop: String,
    #[serde(rename = "area_plantada_ha")]
    pub planted_area_ha: f64,
    #[serde(rename = "precipitacao_mm")]
    pub precipitation_mm: f64,
    #[serde(rename = "temp_media_c")]
    pub mean_temperature_c: f64,
    #[serde(rename = "rendimento_kg_ha")]
    pub yield_kg_ha: f64,
}

/// Dataset column holding the year
pub const COLUMN_YEAR: &str = "ano";
/// Dataset column holding the municipality name
pub const COLUMN_MUNICIPALITY: &str = "municipio";
/// Dataset column holding the crop name
pub const COLUMN_CROP: &str = "cultura";
/// Dataset column holding the planted area in hectares
pub const COLUMN_PLANTED_AREA: &str = "area_plantada_ha";
/// Dataset column holding the annual precipitation in millimetres
pub const COLUMN_PRECIPITATION: &str = "precipitacao_mm";
/// Dataset column holding the mean annual temperature in Celsius
pub const COLUMN_MEAN_TEMPERATURE: &str = "temp_media_c";
/// Dataset column holding the observed yield (the regression target)
pub const COLUMN_YIELD: &str = "rendimento_kg_ha";

/// Every column a training dataset must provide
pub const REQUIRED_COLUMNS: &[&str] = &[
    COLUMN_YEAR,
    COLUMN_MUNICIPALITY,
    COLUMN_CROP,
    COLUMN_PLANTED_AREA,
    COLUMN_PRECIPITATION,
    COLUMN_MEAN_TEMPERATURE,
    COLUMN_YIELD,
];

/// Read access to the model input columns of a row.
///
/// Implemented by both historical records and prediction requests so that the
/// feature pipeline can transform either.
pub trait CropFeatures {
    fn year(&self) -> i32;
    fn municipality(&self) -> &str;
    fn crop(&self) -> &str;
    fn planted_area_ha(&self) -> f64;
    fn precipitation_mm(&self) -> f64;
    fn mean_temperature_c(&self) -> f64;
}

impl CropFeatures for HistoricalRecord {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_dataset_column_names() {
        let record = HistoricalRecord {
            year: 2020,
            municipality: "Chapecó".to_string(),
            crop: "Soja".to_string(),
            planted_area_ha: 120.0,
            precipitation_mm: 1750.0,
            mean_temperature_c: 19.4,
            yield_kg_ha: 3200.0,
        };

        let json = serde_json::to_value(&record).unwrap();
        for column in REQUIRED_COLUMNS {
            assert!(json.get(*column).is_some(), "missing column {}", column);
        }
        assert_eq!(json["municipio"], "Chapecó");
    }
}
