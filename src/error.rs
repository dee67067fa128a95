use thiserror::Error;

/// Main error type for the classifier
#[derive(Error, Debug)]
pub enum GazemoodError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Dataset errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    // Feature vector errors
    #[error("No feature vector provided. Usage: gazemood predict '<features_json>'")]
    MissingFeatures,

    #[error("Invalid JSON format for features")]
    InvalidFeatureJson,

    #[error("Feature vector length mismatch: got {got}, expected {expected}")]
    FeatureLength { got: usize, expected: usize },

    // Artifact errors
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Model record error: {0}")]
    ModelRecord(String),

    // Training errors
    #[error("Training error: {0}")]
    Training(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GazemoodError
pub type Result<T> = std::result::Result<T, GazemoodError>;
