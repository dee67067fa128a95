//! Training command: CSV in, artifacts and evaluation report out.

use tracing::info;

use gazemood::data::{fit_pipeline, PipelineConfig, RawDataset};
use gazemood::error::Result;
use gazemood::training::{evaluate, predict_classes, train, ArtifactStore};
use gazemood::{AppConfig, TrainingConfig};

/// CLI overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct TrainArgs {
    pub data: Option<String>,
    pub out: Option<String>,
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub seed: Option<u64>,
}

pub fn run_train(config: &AppConfig, args: &TrainArgs) -> Result<()> {
    let started_at = chrono::Utc::now();
    let dataset_path = args
        .data
        .clone()
        .unwrap_or_else(|| config.data.dataset_path.clone());
    let artifact_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.data.artifact_dir.clone());

    let training = TrainingConfig {
        epochs: args.epochs.unwrap_or(config.training.epochs),
        batch_size: args.batch_size.unwrap_or(config.training.batch_size),
        seed: args.seed.unwrap_or(config.training.seed),
        ..config.training.clone()
    };

    info!(
        "Training run: dataset={}, artifacts={}, epochs={}, batch_size={}, seed={}",
        dataset_path, artifact_dir, training.epochs, training.batch_size, training.seed
    );

    let raw = RawDataset::from_csv(&dataset_path)?;
    let prepared = fit_pipeline(
        &raw,
        &PipelineConfig {
            test_fraction: training.test_fraction,
            noise_std: training.noise_std,
            seed: training.seed,
        },
    )?;

    let (model, report) = train(&prepared, &training)?;
    let elapsed = chrono::Utc::now() - started_at;
    info!(
        "Training finished in {}s: {} epochs run, best val_loss {:.4} at epoch {}",
        elapsed.num_seconds(),
        report.epochs_run,
        report.best_val_loss,
        report.best_epoch
    );

    // Persist the three inference artifacts
    let store = ArtifactStore::new(&artifact_dir)?;
    store.save_encoder(&prepared.encoder)?;
    store.save_scaler(&prepared.scaler)?;
    store.save_model(&model)?;

    // Held-out evaluation
    let predictions = predict_classes(&model, &prepared.x_test)?;
    let evaluation = evaluate(&prepared.y_test, &predictions, &prepared.encoder.classes)?;
    store.save_confusion_matrix(&evaluation.confusion_csv())?;

    println!("Test accuracy: {:.4}", evaluation.accuracy);
    println!("\nClassification report:");
    println!("{}", evaluation.report_table());
    println!(
        "\nArtifacts written to {}: encoder.json, scaler.json, model.mpk, confusion_matrix.csv",
        store.dir().display()
    );

    Ok(())
}
