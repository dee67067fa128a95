//! Training loop.
//!
//! Fits the classifier with Adam on cross-entropy loss, monitoring a
//! validation carve-out for early stopping. The validation fraction is taken
//! from the tail of the (already shuffled) training split; early stopping
//! restores the best-validation-loss weights before returning.

use burn::backend::Autodiff;
use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::{ElementConversion, TensorData};
use burn_ndarray::NdArray;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::config::TrainingConfig;
use crate::data::dataset::NUM_FEATURES;
use crate::data::pipeline::PreparedData;
use crate::error::{GazemoodError, Result};
use crate::model::{EmotionClassifier, EmotionClassifierConfig};

/// CPU inference backend
pub type InferBackend = NdArray<f32>;
/// Autodiff wrapper used during training
pub type TrainBackend = Autodiff<InferBackend>;

/// Per-epoch training record
#[derive(Debug, Clone)]
pub struct EpochStats {
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: f64,
}

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Epochs actually run (early stopping may cut the budget short)
    pub epochs_run: usize,
    /// Epoch with the best validation loss
    pub best_epoch: usize,
    /// Best validation loss seen
    pub best_val_loss: f64,
    /// Per-epoch history
    pub history: Vec<EpochStats>,
}

/// Fit the classifier on prepared data and return the best weights.
pub fn train(
    prepared: &PreparedData,
    config: &TrainingConfig,
) -> Result<(EmotionClassifier<InferBackend>, TrainReport)> {
    let num_classes = prepared.encoder.num_classes();
    let n = prepared.x_train.len();
    if n < 2 {
        return Err(GazemoodError::Training(format!(
            "Not enough training samples: {}",
            n
        )));
    }

    // Validation carve-out from the tail of the shuffled training split
    let n_val = ((n as f64) * config.validation_fraction).round() as usize;
    let n_fit = n - n_val;
    if n_fit == 0 {
        return Err(GazemoodError::Training(
            "Validation fraction leaves no training samples".to_string(),
        ));
    }

    let device = <TrainBackend as Backend>::Device::default();
    let mut model = EmotionClassifierConfig::new(num_classes).init::<TrainBackend>(&device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = CrossEntropyLossConfig::new().init(&device);
    let val_loss_fn = CrossEntropyLossConfig::new().init(&device);

    let val_x = to_input::<TrainBackend>(&prepared.x_train[n_fit..], &device);
    let val_y = to_targets::<TrainBackend>(&prepared.y_train[n_fit..], &device);

    info!(
        "Training on {} samples ({} validation), {} classes, batch size {}, up to {} epochs",
        n_fit, n_val, num_classes, config.batch_size, config.epochs
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut order: Vec<usize> = (0..n_fit).collect();

    let mut best_model = model.clone();
    let mut best_val_loss = f64::INFINITY;
    let mut best_epoch = 0usize;
    let mut epochs_without_improvement = 0usize;
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        order.shuffle(&mut rng);

        let mut loss_sum = 0.0f64;
        let mut correct = 0i64;

        for batch_indices in order.chunks(config.batch_size.max(1)) {
            let batch_x: Vec<[f64; NUM_FEATURES]> = batch_indices
                .iter()
                .map(|&i| prepared.x_train[i])
                .collect();
            let batch_y: Vec<usize> =
                batch_indices.iter().map(|&i| prepared.y_train[i]).collect();

            let input = to_input::<TrainBackend>(&batch_x, &device);
            let targets = to_targets::<TrainBackend>(&batch_y, &device);

            let logits = model.forward(input);
            let loss = loss_fn.forward(logits.clone(), targets.clone());
            loss_sum += f64::from(loss.clone().into_scalar()) * batch_indices.len() as f64;

            let predictions = logits.argmax(1).squeeze::<1>(1);
            correct += predictions
                .equal(targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }

        let train_loss = loss_sum / n_fit as f64;
        let train_accuracy = correct as f64 / n_fit as f64;

        // Monitor validation loss; fall back to train loss when the dataset
        // is too small to carve a validation set.
        let val_loss = if n_val > 0 {
            let logits = model.forward(val_x.clone());
            f64::from(val_loss_fn.forward(logits, val_y.clone()).into_scalar())
        } else {
            train_loss
        };

        info!(
            "Epoch {}/{}: loss={:.4}, acc={:.3}, val_loss={:.4}",
            epoch, config.epochs, train_loss, train_accuracy, val_loss
        );

        history.push(EpochStats {
            epoch,
            train_loss,
            train_accuracy,
            val_loss,
        });

        if val_loss < best_val_loss {
            best_val_loss = val_loss;
            best_epoch = epoch;
            best_model = model.clone();
            epochs_without_improvement = 0;
        } else {
            epochs_without_improvement += 1;
            if epochs_without_improvement >= config.patience {
                info!(
                    "Early stopping at epoch {} (best val_loss {:.4} at epoch {})",
                    epoch, best_val_loss, best_epoch
                );
                break;
            }
        }
    }

    let report = TrainReport {
        epochs_run: history.len(),
        best_epoch,
        best_val_loss,
        history,
    };

    Ok((best_model.valid(), report))
}

/// Predict class indices for a standardized feature matrix.
pub fn predict_classes(
    model: &EmotionClassifier<InferBackend>,
    rows: &[[f64; NUM_FEATURES]],
) -> Result<Vec<usize>> {
    let device = <InferBackend as Backend>::Device::default();
    let input = to_input::<InferBackend>(rows, &device);
    let predictions = model.forward(input).argmax(1).squeeze::<1>(1);
    let indices = predictions
        .into_data()
        .to_vec::<i64>()
        .map_err(|e| GazemoodError::Internal(format!("Tensor readback failed: {:?}", e)))?;
    Ok(indices.into_iter().map(|i| i as usize).collect())
}

/// Pack rows into a `(N, 9, 1)` float tensor
pub fn to_input<B: Backend>(rows: &[[f64; NUM_FEATURES]], device: &B::Device) -> Tensor<B, 3> {
    let flat: Vec<f32> = rows.iter().flatten().map(|&v| v as f32).collect();
    Tensor::from_data(TensorData::new(flat, [rows.len(), NUM_FEATURES, 1]), device)
}

fn to_targets<B: Backend>(y: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let values: Vec<i64> = y.iter().map(|&v| v as i64).collect();
    Tensor::from_data(TensorData::new(values, [y.len()]), device)
}
