//! Info command: inspect a trained artifact directory.

use gazemood::error::Result;
use gazemood::training::ArtifactStore;

pub fn run_info(model_dir: &str) -> Result<()> {
    let store = ArtifactStore::open(model_dir)?;

    println!("Artifact directory: {}", store.dir().display());
    println!(
        "Model record:       {}",
        if store.model_path().exists() {
            "present"
        } else {
            "missing"
        }
    );

    match store.load_encoder() {
        Ok(encoder) => {
            println!("Classes ({}):", encoder.num_classes());
            for (i, class) in encoder.classes.iter().enumerate() {
                println!("  [{}] {}", i, class);
            }
        }
        Err(e) => println!("Encoder:            unavailable ({})", e),
    }

    match store.load_scaler() {
        Ok(scaler) => {
            println!("Scaler mean:        {:?}", scaler.mean);
            println!("Scaler variance:    {:?}", scaler.variance);
        }
        Err(e) => println!("Scaler:             unavailable ({})", e),
    }

    Ok(())
}
