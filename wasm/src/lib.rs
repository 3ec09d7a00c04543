//! WebAssembly module for the PAM yield prediction form
//!
//! Provides client-side computation for:
//! - Form validation before a scenario is submitted
//! - Total production from a predicted yield
//! - Trimming a crop ranking for display

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("pam-yield-wasm ready"));
}

/// Validate a scenario before submitting it.
///
/// Rejects with an `Error` whose message is the JSON list of field violations.
#[wasm_bindgen]
pub fn validate_prediction_request(request_json: &str) -> Result<(), JsValue> {
    check_request(request_json).map_err(js_error)
}

/// Total production in tonnes
#[wasm_bindgen]
pub fn calculate_total_production(yield_kg_ha: f64, planted_area_ha: f64) -> f64 {
    total_production_t(yield_kg_ha, planted_area_ha)
}

/// Keep the best `n` crops of a serialized ranking
#[wasm_bindgen]
pub fn top_crops(ranking_json: &str, n: usize) -> Result<String, JsValue> {
    truncate_ranking(ranking_json, n).map_err(js_error)
}

/// Initial form values as a JSON prediction request
#[wasm_bindgen]
pub fn default_request() -> String {
    let request: PredictionRequest = FormDefaults::default().into();
    serde_json::to_string(&request).unwrap_or_default()
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn check_request(request_json: &str) -> Result<(), String> {
    let request: PredictionRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request JSON: {}", e))?;

    shared::validation::validate_prediction_request(&request)
        .map_err(|violations| serde_json::to_string(&violations).unwrap_or_default())
}

fn truncate_ranking(ranking_json: &str, n: usize) -> Result<String, String> {
    let ranking: CropRanking =
        serde_json::from_str(ranking_json).map_err(|e| format!("Invalid ranking JSON: {}", e))?;
    serde_json::to_string(&ranking.top(n)).map_err(|e| e.to_string())
}
