pub mod config;
pub mod data;
pub mod error;
pub mod infer;
pub mod model;
pub mod training;

pub use config::{AppConfig, TrainingConfig};
pub use data::{
    fit_pipeline, LabelEncoder, MeanImputer, PipelineConfig, PreparedData, RawDataset,
    StandardScaler, FEATURE_COLUMNS, NUM_FEATURES, TARGET_COLUMN,
};
pub use error::{GazemoodError, Result};
pub use infer::{parse_features, Prediction, Predictor};
pub use model::{EmotionClassifier, EmotionClassifierConfig, TemporalAttention};
pub use training::{evaluate, train, ArtifactStore, Evaluation, TrainReport};
