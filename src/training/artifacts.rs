//! Artifact persistence.
//!
//! Three artifacts are written after training, each independent and
//! order-insensitive: the encoder classes (`encoder.json`), the scaler
//! statistics (`scaler.json`) and the trained model record (`model.mpk`).
//! All three are required together for correct inference; no versioning or
//! compatibility check is performed.

use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use tracing::info;

use crate::data::pipeline::{LabelEncoder, StandardScaler};
use crate::error::{GazemoodError, Result};
use crate::model::{EmotionClassifier, EmotionClassifierConfig};

const ENCODER_FILE: &str = "encoder.json";
const SCALER_FILE: &str = "scaler.json";
const MODEL_FILE: &str = "model.mpk";
const CONFUSION_FILE: &str = "confusion_matrix.csv";

/// Reads and writes training artifacts under a single directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    /// Open an existing artifact directory without creating it
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(GazemoodError::ArtifactNotFound(dir.display().to_string()));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(ENCODER_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn confusion_matrix_path(&self) -> PathBuf {
        self.dir.join(CONFUSION_FILE)
    }

    /// Whether all three inference artifacts are present
    pub fn is_complete(&self) -> bool {
        self.encoder_path().exists() && self.scaler_path().exists() && self.model_path().exists()
    }

    pub fn save_encoder(&self, encoder: &LabelEncoder) -> Result<PathBuf> {
        let path = self.encoder_path();
        fs::write(&path, serde_json::to_string(encoder)?)?;
        info!("Saved encoder classes to {}", path.display());
        Ok(path)
    }

    pub fn load_encoder(&self) -> Result<LabelEncoder> {
        let path = self.encoder_path();
        if !path.exists() {
            return Err(GazemoodError::ArtifactNotFound(path.display().to_string()));
        }
        let encoder: LabelEncoder = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if encoder.classes.is_empty() {
            return Err(GazemoodError::Validation(
                "Encoder artifact has no classes".to_string(),
            ));
        }
        Ok(encoder)
    }

    pub fn save_scaler(&self, scaler: &StandardScaler) -> Result<PathBuf> {
        let path = self.scaler_path();
        fs::write(&path, serde_json::to_string(scaler)?)?;
        info!("Saved scaler mean/variance to {}", path.display());
        Ok(path)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler> {
        let path = self.scaler_path();
        if !path.exists() {
            return Err(GazemoodError::ArtifactNotFound(path.display().to_string()));
        }
        let scaler: StandardScaler = serde_json::from_str(&fs::read_to_string(&path)?)?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Save the trained model record
    pub fn save_model<B: Backend>(&self, model: &EmotionClassifier<B>) -> Result<PathBuf> {
        let path = self.model_path();
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        model
            .clone()
            .save_file(&path, &recorder)
            .map_err(|e| GazemoodError::ModelRecord(format!("Failed to save model: {}", e)))?;
        info!("Saved model record to {}", path.display());
        Ok(path)
    }

    /// Rebuild the network from its shape parameters and load the record.
    ///
    /// The architecture carries no extra hyperparameters, so the class count
    /// from the persisted encoder is enough to reconstruct it.
    pub fn load_model<B: Backend>(
        &self,
        num_classes: usize,
        device: &B::Device,
    ) -> Result<EmotionClassifier<B>> {
        let path = self.model_path();
        if !path.exists() {
            return Err(GazemoodError::ArtifactNotFound(path.display().to_string()));
        }

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        EmotionClassifierConfig::new(num_classes)
            .init::<B>(device)
            .load_file(&path, &recorder, device)
            .map_err(|e| GazemoodError::ModelRecord(format!("Failed to load model: {}", e)))
    }

    pub fn save_confusion_matrix(&self, csv: &str) -> Result<PathBuf> {
        let path = self.confusion_matrix_path();
        fs::write(&path, csv)?;
        info!("Saved confusion matrix to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use std::env::temp_dir;

    type TestBackend = NdArray<f32>;

    fn scratch(name: &str) -> PathBuf {
        let dir = temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn artifact_paths_live_under_the_store_dir() {
        let store = ArtifactStore::new(scratch("gazemood_store_paths")).unwrap();
        assert!(store.encoder_path().ends_with("encoder.json"));
        assert!(store.scaler_path().ends_with("scaler.json"));
        assert!(store.model_path().ends_with("model.mpk"));
        assert!(!store.is_complete());
    }

    #[test]
    fn encoder_roundtrips_through_json() {
        let store = ArtifactStore::new(scratch("gazemood_store_encoder")).unwrap();
        let encoder = LabelEncoder {
            classes: vec!["boredom".into(), "focus".into()],
        };

        store.save_encoder(&encoder).unwrap();
        assert_eq!(store.load_encoder().unwrap(), encoder);

        let raw = fs::read_to_string(store.encoder_path()).unwrap();
        assert_eq!(raw, r#"{"classes":["boredom","focus"]}"#);
    }

    #[test]
    fn scaler_roundtrips_and_validates() {
        let store = ArtifactStore::new(scratch("gazemood_store_scaler")).unwrap();
        let scaler = StandardScaler {
            mean: vec![1.0; 9],
            variance: vec![2.0; 9],
        };

        store.save_scaler(&scaler).unwrap();
        let loaded = store.load_scaler().unwrap();
        assert_eq!(loaded.mean, scaler.mean);
        assert_eq!(loaded.variance, scaler.variance);

        // Truncated stats must be rejected on load
        fs::write(
            store.scaler_path(),
            r#"{"mean":[1.0],"variance":[1.0]}"#,
        )
        .unwrap();
        assert!(store.load_scaler().is_err());
    }

    #[test]
    fn model_record_roundtrips() {
        let store = ArtifactStore::new(scratch("gazemood_store_model")).unwrap();
        let device = Default::default();
        let model = EmotionClassifierConfig::new(3).init::<TestBackend>(&device);

        store.save_model(&model).unwrap();
        let loaded = store.load_model::<TestBackend>(3, &device).unwrap();

        let input =
            burn::tensor::Tensor::<TestBackend, 3>::ones([1, crate::data::NUM_FEATURES, 1], &device);
        let original = model
            .forward_probs(input.clone())
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        let restored = loaded
            .forward_probs(input)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn missing_artifacts_are_reported() {
        let store = ArtifactStore::new(scratch("gazemood_store_missing")).unwrap();
        assert!(matches!(
            store.load_encoder(),
            Err(GazemoodError::ArtifactNotFound(_))
        ));
        let device = Default::default();
        assert!(matches!(
            store.load_model::<TestBackend>(2, &device),
            Err(GazemoodError::ArtifactNotFound(_))
        ));
    }
}
