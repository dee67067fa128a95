use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the training dataset CSV
    pub dataset_path: String,
    /// Directory where model/encoder/scaler artifacts are written
    pub artifact_dir: String,
}

/// Training hyperparameters
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Maximum training epochs
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Fraction of data held out for the test split
    pub test_fraction: f64,
    /// Fraction of the training split carved out for validation
    pub validation_fraction: f64,
    /// Early stopping patience in epochs (on validation loss)
    pub patience: usize,
    /// Standard deviation of the Gaussian noise augmentation
    pub noise_std: f64,
    /// RNG seed for splits, shuffling and augmentation
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 30,
            batch_size: 32,
            learning_rate: 1e-3,
            test_fraction: 0.20,
            validation_fraction: 0.20,
            patience: 10,
            noise_std: 0.1,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Output JSON formatted logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("data.dataset_path", "data/eye_tracking.csv")?
            .set_default("data.artifact_dir", "model")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GAZEMOOD_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GAZEMOOD_DATA__DATASET_PATH, etc.)
            .add_source(
                Environment::with_prefix("GAZEMOOD")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config_files() {
        let config = AppConfig::load_from(std::env::temp_dir().join("gazemood_no_config"))
            .expect("defaults should load");

        assert_eq!(config.data.artifact_dir, "model");
        assert_eq!(config.training.epochs, 30);
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.training.patience, 10);
        assert!((config.training.noise_std - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn logging_section_comes_from_config_file() {
        let dir = std::env::temp_dir().join("gazemood_config_logging");
        std::fs::create_dir_all(&dir).expect("temp config dir");
        std::fs::write(
            dir.join("default.toml"),
            "[logging]\nlevel = \"debug\"\njson = true\n",
        )
        .expect("write default.toml");

        let config = AppConfig::load_from(&dir).expect("config should load");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn training_defaults_match_fixed_hyperparameters() {
        let training = TrainingConfig::default();
        assert!((training.test_fraction - 0.20).abs() < f64::EPSILON);
        assert!((training.validation_fraction - 0.20).abs() < f64::EPSILON);
        assert_eq!(training.seed, 42);
    }
}
