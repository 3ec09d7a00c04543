//! Configuration management for the PAM yield prediction service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PAM_ prefix

use std::path::{Path, PathBuf};

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::ml::ForestParams;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Historical dataset configuration
    pub data: DataConfig,

    /// Model storage and training configuration
    pub model: ModelConfig,

    /// Crop recommendation configuration
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// CSV file with the historical records
    pub csv_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Previously trained model to load at startup
    pub load_path: PathBuf,

    /// Where a model trained in-process is written
    pub save_path: PathBuf,

    /// Number of trees in the forest
    pub n_trees: usize,

    /// Seed for bootstrap sampling and feature selection
    pub seed: u64,

    /// Resolve the model before accepting requests
    pub warm_start: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    /// Years before the reference year included in the window
    pub window_years: i32,

    /// Number of crops returned with a prediction
    pub top_n: usize,
}

impl Config {
    /// Load configuration from `config/` and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Load configuration with environment files read from `config_dir`
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let environment = std::env::var("PAM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8501)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("data.csv_path", "data/pam_sintetico_multiculturas_50k.csv")?
            .set_default("model.load_path", "models/modelo_pam_multiculturas.json")?
            .set_default(
                "model.save_path",
                "models/modelo_pam_multiculturas_retrained.json",
            )?
            .set_default("model.n_trees", 150)?
            .set_default("model.seed", 42)?
            .set_default("model.warm_start", true)?
            .set_default("recommendation.window_years", 5)?
            .set_default("recommendation.top_n", 3)?
            // Load environment-specific config file
            .add_source(File::from(config_dir.join(&environment)).required(false))
            // Override with environment variables (PAM_ prefix)
            .add_source(
                Environment::with_prefix("PAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ModelConfig {
    /// Forest hyperparameters derived from this configuration
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            seed: self.seed,
            ..ForestParams::default()
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            window_years: 5,
            top_n: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config_keeps_forest_defaults() {
        let config_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config");
        let config = Config::load_from(&config_dir).unwrap();

        // Read from development.toml rather than the coded default
        assert_eq!(config.data.csv_path, PathBuf::from("data/pam_amostra.csv"));

        let params = config.model.forest_params();
        assert_eq!(params.n_trees, 150);
        assert_eq!(params.seed, 42);
        assert_eq!(config.recommendation.window_years, 5);
        assert_eq!(config.recommendation.top_n, 3);
    }

    #[test]
    fn test_missing_config_dir_uses_coded_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/config")).unwrap();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.model.n_trees, 150);
        assert!(config.model.warm_start);
    }
}
