//! CSV dataset loading.
//!
//! The training data is a flat CSV with nine named eye-tracking feature
//! columns and an `emotion_state` target column. Missing numeric cells are
//! kept as NaN so the imputation stage can fill them from training means.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{GazemoodError, Result};

/// Number of eye-tracking features per sample
pub const NUM_FEATURES: usize = 9;

/// Feature columns in model input order
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    "Num_of_Fixations",
    "Mean_Fixation_Duration",
    "SD_Fixation_Duration",
    "Num_of_Saccade",
    "Mean_Saccade_Duration",
    "Mean_Saccade_Amplitude",
    "Num_of_Blink",
    "Mean_Blink_Duration",
    "Num_of_Microsac",
];

/// Target column holding the emotion label
pub const TARGET_COLUMN: &str = "emotion_state";

/// Raw tabular dataset as read from disk, prior to any preprocessing.
#[derive(Debug, Clone)]
pub struct RawDataset {
    /// Row-major feature matrix, NaN for missing cells
    pub features: Vec<[f64; NUM_FEATURES]>,
    /// Emotion label per row
    pub labels: Vec<String>,
}

impl RawDataset {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Load a dataset from a CSV file.
    ///
    /// The header row is used to locate the feature and target columns, so
    /// column order in the file does not matter.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            GazemoodError::Dataset(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);

        let mut lines = reader.lines().enumerate();
        let (fidx, target_idx) = match lines.next() {
            Some((_, line)) => {
                let line = line.map_err(|e| {
                    GazemoodError::Dataset(format!("Failed to read header: {}", e))
                })?;
                let parts: Vec<&str> = line.split(',').map(str::trim).collect();
                resolve_columns(&parts)?
            }
            None => {
                return Err(GazemoodError::Dataset(format!(
                    "Empty file: {}",
                    path.display()
                )))
            }
        };
        let width = fidx.iter().copied().max().unwrap_or(0).max(target_idx);

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (i, line) in lines {
            let line = line
                .map_err(|e| GazemoodError::Dataset(format!("Failed to read line {}: {}", i, e)))?;
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();

            if parts.len() <= width {
                warn!("Skipping malformed line {}: insufficient columns", i);
                continue;
            }

            let label = parts[target_idx].to_string();
            if label.is_empty() {
                warn!("Skipping line {}: empty {} value", i, TARGET_COLUMN);
                continue;
            }

            let mut row = [f64::NAN; NUM_FEATURES];
            for (slot, &col) in row.iter_mut().zip(fidx.iter()) {
                // Unparseable or empty cells stay NaN for the imputer
                if let Ok(v) = parts[col].parse::<f64>() {
                    *slot = v;
                }
            }

            features.push(row);
            labels.push(label);
        }

        if features.is_empty() {
            return Err(GazemoodError::Dataset(format!(
                "No usable rows in {}",
                path.display()
            )));
        }

        info!(
            "Loaded {} samples x {} features from {}",
            features.len(),
            NUM_FEATURES,
            path.display()
        );

        Ok(Self { features, labels })
    }
}

fn resolve_columns(header: &[&str]) -> Result<([usize; NUM_FEATURES], usize)> {
    let mut feature_idx = [0usize; NUM_FEATURES];
    for (slot, name) in feature_idx.iter_mut().zip(FEATURE_COLUMNS.iter()) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| GazemoodError::MissingColumn((*name).to_string()))?;
    }
    let target_idx = header
        .iter()
        .position(|h| *h == TARGET_COLUMN)
        .ok_or_else(|| GazemoodError::MissingColumn(TARGET_COLUMN.to_string()))?;
    Ok((feature_idx, target_idx))
}
