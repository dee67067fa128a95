//! One-shot inference.
//!
//! Loads the persisted encoder, scaler and model record, scores a single
//! nine-value feature vector and returns class probabilities in the persisted
//! class order. The forward pass runs on the plain ndarray backend with no
//! stochastic layers, so output is fully deterministic for given weights and
//! input.

use burn::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::data::dataset::NUM_FEATURES;
use crate::data::pipeline::{LabelEncoder, StandardScaler};
use crate::error::{GazemoodError, Result};
use crate::model::EmotionClassifier;
use crate::training::trainer::{to_input, InferBackend};
use crate::training::ArtifactStore;

/// Stdout payload of the predict command
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Class probabilities aligned with the persisted class order
    #[serde(rename = "emotionProbs")]
    pub emotion_probs: Vec<f32>,
}

/// Loaded artifact set ready to score feature vectors.
pub struct Predictor {
    model: EmotionClassifier<InferBackend>,
    encoder: LabelEncoder,
    scaler: StandardScaler,
    device: <InferBackend as Backend>::Device,
}

impl Predictor {
    /// Load all three artifacts from a store.
    ///
    /// The class count from the encoder drives model reconstruction, so a
    /// missing or empty encoder fails here rather than at forward time.
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let encoder = store.load_encoder()?;
        let scaler = store.load_scaler()?;
        let device = <InferBackend as Backend>::Device::default();
        let model = store.load_model::<InferBackend>(encoder.num_classes(), &device)?;

        debug!(
            "Loaded artifacts from {} ({} classes)",
            store.dir().display(),
            encoder.num_classes()
        );

        Ok(Self {
            model,
            encoder,
            scaler,
            device,
        })
    }

    /// Persisted class labels, index-aligned with prediction output
    pub fn classes(&self) -> &[String] {
        &self.encoder.classes
    }

    /// Score one feature vector.
    ///
    /// With `normalize` the persisted scaler statistics are applied first;
    /// without it the raw values are only reshaped, matching the historical
    /// serving behavior where the caller pre-normalizes.
    pub fn predict(&self, features: [f64; NUM_FEATURES], normalize: bool) -> Result<Prediction> {
        let mut row = features;
        if normalize {
            self.scaler.transform_row(&mut row);
        }

        let input = to_input::<InferBackend>(&[row], &self.device);
        let probs = self
            .model
            .forward_probs(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| GazemoodError::Internal(format!("Tensor readback failed: {:?}", e)))?;

        Ok(Prediction {
            emotion_probs: probs,
        })
    }

    /// Index and label of the most probable class
    pub fn top_class(&self, prediction: &Prediction) -> Option<(usize, &str)> {
        prediction
            .emotion_probs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .and_then(|(i, _)| self.encoder.inverse(i).map(|label| (i, label)))
    }
}

/// Parse the CLI feature argument: a JSON array of exactly nine numbers.
pub fn parse_features(raw: &str) -> Result<[f64; NUM_FEATURES]> {
    let values: Vec<f64> =
        serde_json::from_str(raw).map_err(|_| GazemoodError::InvalidFeatureJson)?;
    if values.len() != NUM_FEATURES {
        return Err(GazemoodError::FeatureLength {
            got: values.len(),
            expected: NUM_FEATURES,
        });
    }
    let mut features = [0.0f64; NUM_FEATURES];
    features.copy_from_slice(&values);
    Ok(features)
}
