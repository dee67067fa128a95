//! Dataset loading and preprocessing.

pub mod dataset;
pub mod pipeline;

pub use dataset::{RawDataset, FEATURE_COLUMNS, NUM_FEATURES, TARGET_COLUMN};
pub use pipeline::{
    fit_pipeline, LabelEncoder, MeanImputer, PipelineConfig, PreparedData, StandardScaler,
};
