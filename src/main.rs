use clap::{Parser, Subcommand};
use gazemood::config::{AppConfig, LoggingConfig};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{run_info, run_predict, run_train, TrainArgs};

#[derive(Parser)]
#[command(name = "gazemood")]
#[command(version = "0.1.0")]
#[command(about = "Eye-tracking emotion classifier (CNN + GRU + attention)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory path
    #[arg(short, long, default_value = "config")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the classifier and write artifacts
    Train {
        /// Path to the training dataset CSV (overrides config)
        #[arg(long)]
        data: Option<String>,
        /// Artifact output directory (overrides config)
        #[arg(long)]
        out: Option<String>,
        /// Maximum training epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Mini-batch size
        #[arg(long)]
        batch_size: Option<usize>,
        /// RNG seed for splits and augmentation
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Score a JSON feature vector against trained artifacts
    Predict {
        /// JSON array of 9 feature values, e.g. '[5,200,50,3,150,0.02,1,120,2]'
        features: Option<String>,
        /// Artifact directory holding encoder.json, scaler.json and model.mpk
        #[arg(long, default_value = "model")]
        model_dir: String,
        /// Apply the persisted scaler statistics before scoring
        #[arg(long)]
        normalize: bool,
    },
    /// Show metadata for a trained artifact directory
    Info {
        /// Artifact directory
        #[arg(long, default_value = "model")]
        model_dir: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Train {
            data,
            out,
            epochs,
            batch_size,
            seed,
        } => {
            let args = TrainArgs {
                data: data.clone(),
                out: out.clone(),
                epochs: *epochs,
                batch_size: *batch_size,
                seed: *seed,
            };
            match AppConfig::load_from(&cli.config) {
                Ok(config) => {
                    init_logging(&config.logging);
                    run_train(&config, &args)
                }
                Err(e) => {
                    init_logging_stderr();
                    Err(e.into())
                }
            }
        }
        Commands::Predict {
            features,
            model_dir,
            normalize,
        } => {
            init_logging_stderr();
            run_predict(features.as_deref(), model_dir, *normalize)
        }
        Commands::Info { model_dir } => {
            init_logging_stderr();
            run_info(model_dir)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    // RUST_LOG wins; the configured level is the fallback
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},gazemood=debug", logging.level)));

    // Optional daily rolling file log alongside the console output.
    //
    // `tracing_appender::rolling::daily` panics if it can't create the
    // initial log file, so writability is checked first.
    let file_layer = std::env::var("GAZEMOOD_LOG_DIR").ok().and_then(|log_dir| {
        if std::fs::create_dir_all(&log_dir).is_err() {
            eprintln!("Warning: could not create log directory {}, file logging disabled", log_dir);
            return None;
        }
        let test_path = std::path::Path::new(&log_dir).join(".gazemood_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);
                let file_appender = tracing_appender::rolling::daily(&log_dir, "gazemood.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // Keep the guard alive for the process lifetime
                Box::leak(Box::new(guard));
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    });

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);
        registry.with(console_layer).init();
    }
}

fn init_logging_stderr() {
    // Stdout carries the prediction JSON, so logs must not pollute it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
