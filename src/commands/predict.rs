//! Predict command: JSON feature array in, one JSON line of probabilities out.
//!
//! Stdout carries exactly the prediction object so callers can pipe it;
//! everything else (logs, errors) goes to stderr.

use tracing::debug;

use gazemood::error::{GazemoodError, Result};
use gazemood::infer::{parse_features, Predictor};
use gazemood::training::ArtifactStore;

pub fn run_predict(
    features_arg: Option<&str>,
    model_dir: &str,
    normalize: bool,
) -> Result<()> {
    let raw = features_arg.ok_or(GazemoodError::MissingFeatures)?;
    let features = parse_features(raw)?;

    let store = ArtifactStore::open(model_dir)?;
    let predictor = Predictor::load(&store)?;
    let prediction = predictor.predict(features, normalize)?;

    if let Some((index, label)) = predictor.top_class(&prediction) {
        debug!("Top class: {} (index {})", label, index);
    }

    println!("{}", serde_json::to_string(&prediction)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_argument_reports_no_feature_vector() {
        let err = run_predict(None, "model", false).unwrap_err();
        assert!(matches!(err, GazemoodError::MissingFeatures));
        assert!(err.to_string().contains("No feature vector provided"));
    }
}
