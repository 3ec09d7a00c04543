//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::Path;

use pam_server::config::ModelConfig;
use pam_server::services::Dataset;
use shared::{HistoricalRecord, PredictionRequest};

pub fn record(
    year: i32,
    municipality: &str,
    crop: &str,
    planted_area_ha: f64,
    yield_kg_ha: f64,
) -> HistoricalRecord {
    HistoricalRecord {
        year,
        municipality: municipality.to_string(),
        crop: crop.to_string(),
        planted_area_ha,
        precipitation_mm: 1800.0,
        mean_temperature_c: 20.0,
        yield_kg_ha,
    }
}

/// Three municipalities, three crops, ten seasons, with yield depending on
/// crop, rainfall and temperature
pub fn synthetic_dataset() -> Dataset {
    let municipalities = ["Chapecó", "Concórdia", "Xanxerê"];
    let crops = [("Feijão", 1500.0), ("Milho", 6000.0), ("Soja", 3200.0)];

    let mut records = Vec::new();
    for year in 2015..2025 {
        for (m_idx, municipality) in municipalities.iter().enumerate() {
            for (c_idx, (crop, base)) in crops.iter().enumerate() {
                let k = (year - 2015) as usize * 9 + m_idx * 3 + c_idx;
                let precipitation = 1500.0 + (k % 11) as f64 * 50.0;
                let temperature = 17.0 + (k % 7) as f64 * 0.8;
                records.push(HistoricalRecord {
                    year,
                    municipality: municipality.to_string(),
                    crop: crop.to_string(),
                    planted_area_ha: 50.0 + (k % 13) as f64 * 20.0,
                    precipitation_mm: precipitation,
                    mean_temperature_c: temperature,
                    yield_kg_ha: base + (precipitation - 1750.0) * 0.8 - (temperature - 20.0) * 40.0,
                });
            }
        }
    }
    Dataset::new(records)
}

pub fn request(municipality: &str, crop: &str) -> PredictionRequest {
    PredictionRequest {
        year: 2024,
        municipality: municipality.to_string(),
        crop: crop.to_string(),
        planted_area_ha: 50.0,
        precipitation_mm: 1800.0,
        mean_temperature_c: 20.0,
    }
}

pub fn model_config(dir: &Path, n_trees: usize) -> ModelConfig {
    ModelConfig {
        load_path: dir.join("modelo_pam_multiculturas.json"),
        save_path: dir.join("modelo_pam_multiculturas_retrained.json"),
        n_trees,
        seed: 42,
        warm_start: false,
    }
}
