//! Neural network architecture.
//!
//! The attention layer lives in its own module and is shared by the training
//! and inference paths, so both sides reconstruct the exact same computation
//! from one definition.

pub mod attention;
pub mod classifier;

pub use attention::{TemporalAttention, TemporalAttentionConfig};
pub use classifier::{EmotionClassifier, EmotionClassifierConfig};
