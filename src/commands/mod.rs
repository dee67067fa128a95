//! Command handlers for the CLI entry point.

mod info;
mod predict;
mod train;

pub use info::run_info;
pub use predict::run_predict;
pub use train::{run_train, TrainArgs};
