//! Preprocessing pipeline.
//!
//! The fit-and-transform steps run in a fixed order, each stage consuming the
//! previous stage's output and capturing its fitted parameters:
//!
//! 1. label encoding (sorted distinct classes)
//! 2. stratified train/test split
//! 3. mean imputation (fitted on the training split only)
//! 4. standardization (fitted on the training split only)
//! 5. Gaussian noise augmentation (training split only, once per run)
//!
//! The fitted encoder and scaler must be persisted alongside the model so
//! inference can reproduce the exact same transforms.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::dataset::{RawDataset, NUM_FEATURES};
use crate::error::{GazemoodError, Result};

/// Maps emotion labels to stable integer indices.
///
/// Classes are stored sorted so the index↔label mapping is reproducible from
/// the persisted `classes` list alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit the encoder on a label column
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Number of distinct classes
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Map each label to its class index
    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| GazemoodError::Validation(format!("Unknown label: {}", label)))
            })
            .collect()
    }

    /// Map a class index back to its label
    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}

/// Fills missing feature values with per-feature training means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanImputer {
    pub means: Vec<f64>,
}

impl MeanImputer {
    /// Fit per-feature means on the training rows, ignoring NaN cells
    pub fn fit(rows: &[[f64; NUM_FEATURES]]) -> Self {
        let mut means = vec![0.0f64; NUM_FEATURES];
        for (j, mean) in means.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut count = 0usize;
            for row in rows {
                if row[j].is_finite() {
                    sum += row[j];
                    count += 1;
                }
            }
            if count > 0 {
                *mean = sum / count as f64;
            }
        }
        Self { means }
    }

    /// Replace NaN cells with the fitted means
    pub fn transform(&self, rows: &mut [[f64; NUM_FEATURES]]) {
        for row in rows.iter_mut() {
            for (j, cell) in row.iter_mut().enumerate() {
                if !cell.is_finite() {
                    *cell = self.means[j];
                }
            }
        }
    }
}

/// Per-feature standardization: `(x - mean) / sqrt(variance)`.
///
/// Variance is the population variance of the imputed training split. The
/// persisted `mean`/`variance` values are the single source of truth for the
/// transform; they are never recomputed at inference time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
}

impl StandardScaler {
    /// Fit mean and population variance per feature
    pub fn fit(rows: &[[f64; NUM_FEATURES]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut mean = vec![0.0f64; NUM_FEATURES];
        let mut variance = vec![0.0f64; NUM_FEATURES];

        for (j, m) in mean.iter_mut().enumerate() {
            *m = rows.iter().map(|r| r[j]).sum::<f64>() / n;
        }
        for (j, v) in variance.iter_mut().enumerate() {
            *v = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n;
        }

        Self { mean, variance }
    }

    /// Standardize rows in place using the fitted statistics
    pub fn transform(&self, rows: &mut [[f64; NUM_FEATURES]]) {
        for row in rows.iter_mut() {
            self.transform_row(row);
        }
    }

    /// Standardize a single feature vector in place
    pub fn transform_row(&self, row: &mut [f64; NUM_FEATURES]) {
        for (j, cell) in row.iter_mut().enumerate() {
            // Constant features pass through unscaled
            let denom = if self.variance[j] > 0.0 {
                self.variance[j].sqrt()
            } else {
                1.0
            };
            *cell = (*cell - self.mean[j]) / denom;
        }
    }

    /// Basic shape/finiteness checks for loaded artifacts
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != NUM_FEATURES || self.variance.len() != NUM_FEATURES {
            return Err(GazemoodError::Validation(format!(
                "Scaler stats length mismatch: mean {}, variance {}, expected {}",
                self.mean.len(),
                self.variance.len(),
                NUM_FEATURES
            )));
        }
        if self
            .mean
            .iter()
            .chain(self.variance.iter())
            .any(|v| !v.is_finite())
        {
            return Err(GazemoodError::Validation(
                "Scaler stats contain non-finite values".to_string(),
            ));
        }
        if self.variance.iter().any(|v| *v < 0.0) {
            return Err(GazemoodError::Validation(
                "Scaler variance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pipeline knobs passed down from the training configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fraction of samples held out for the test split
    pub test_fraction: f64,
    /// Standard deviation of the Gaussian noise augmentation
    pub noise_std: f64,
    /// RNG seed for the split, shuffling and augmentation
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.20,
            noise_std: 0.1,
            seed: 42,
        }
    }
}

/// Output of the fitted pipeline: standardized splits plus fitted artifacts.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: Vec<[f64; NUM_FEATURES]>,
    pub y_train: Vec<usize>,
    pub x_test: Vec<[f64; NUM_FEATURES]>,
    pub y_test: Vec<usize>,
    pub encoder: LabelEncoder,
    pub imputer: MeanImputer,
    pub scaler: StandardScaler,
}

/// Run all pipeline stages in order over a raw dataset.
pub fn fit_pipeline(raw: &RawDataset, config: &PipelineConfig) -> Result<PreparedData> {
    if raw.is_empty() {
        return Err(GazemoodError::Dataset("Empty dataset".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    // Stage 1: label encoding
    let encoder = LabelEncoder::fit(&raw.labels);
    if encoder.num_classes() < 2 {
        return Err(GazemoodError::Dataset(format!(
            "Need at least 2 classes, found {}",
            encoder.num_classes()
        )));
    }
    let y = encoder.transform(&raw.labels)?;

    // Stage 2: stratified split
    let (train_idx, test_idx) = stratified_split(&y, config.test_fraction, &mut rng);
    let mut x_train: Vec<[f64; NUM_FEATURES]> =
        train_idx.iter().map(|&i| raw.features[i]).collect();
    let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
    let mut x_test: Vec<[f64; NUM_FEATURES]> = test_idx.iter().map(|&i| raw.features[i]).collect();
    let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();

    // Stage 3: mean imputation fitted on train only
    let imputer = MeanImputer::fit(&x_train);
    imputer.transform(&mut x_train);
    imputer.transform(&mut x_test);

    // Stage 4: standardization fitted on imputed train only
    let scaler = StandardScaler::fit(&x_train);
    scaler.transform(&mut x_train);
    scaler.transform(&mut x_test);

    // Stage 5: noise augmentation, train only, once per run
    add_gaussian_noise(&mut x_train, config.noise_std, &mut rng);

    info!(
        "Pipeline fitted: {} train / {} test samples, {} classes",
        x_train.len(),
        x_test.len(),
        encoder.num_classes()
    );

    Ok(PreparedData {
        x_train,
        y_train,
        x_test,
        y_test,
        encoder,
        imputer,
        scaler,
    })
}

/// Split sample indices into train/test preserving class proportions.
///
/// Per-class index pools are shuffled before the test count is taken, and the
/// combined train/test orders are shuffled again so downstream validation
/// carve-outs never see a class-sorted tail.
pub fn stratified_split(
    y: &[usize],
    test_fraction: f64,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &class) in y.iter().enumerate() {
        by_class.entry(class).or_default().push(i);
    }

    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();

    for (_, mut indices) in by_class {
        indices.shuffle(rng);
        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(indices.len().saturating_sub(1));
        test_idx.extend(indices.drain(..n_test));
        train_idx.extend(indices);
    }

    train_idx.shuffle(rng);
    test_idx.shuffle(rng);
    (train_idx, test_idx)
}

/// Add zero-mean Gaussian noise via Box-Muller.
fn add_gaussian_noise(rows: &mut [[f64; NUM_FEATURES]], std_dev: f64, rng: &mut StdRng) {
    if std_dev <= 0.0 {
        return;
    }
    for row in rows.iter_mut() {
        for cell in row.iter_mut() {
            *cell += randn(rng) * std_dev;
        }
    }
}

/// Standard normal sample using the Box-Muller transform
fn randn(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-12);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
