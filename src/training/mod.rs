//! Model training, evaluation and artifact persistence.

pub mod artifacts;
pub mod metrics;
pub mod trainer;

pub use artifacts::ArtifactStore;
pub use metrics::{evaluate, ClassMetrics, Evaluation};
pub use trainer::{predict_classes, train, EpochStats, InferBackend, TrainBackend, TrainReport};
