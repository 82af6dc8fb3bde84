//! Dataset summary.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{open_loader, output_result};
use crate::Cli;

/// Summarize the dataset a config describes.
#[derive(Args)]
pub struct InfoCommand {
    /// Dataset config (YAML)
    #[arg(long)]
    config: PathBuf,

    /// Batch size used for the batch counts
    #[arg(short = 'b', long, default_value_t = 64)]
    batch_size: usize,
}

#[derive(Serialize)]
struct DatasetInfo {
    files: usize,
    classes: usize,
    input_shape: (usize, usize),
    batch_size: usize,
    train_samples: usize,
    train_batches: usize,
    val_samples: usize,
    val_batches: usize,
    augmentation: bool,
    supervised: bool,
}

impl InfoCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let loader = open_loader(&self.config)?;
        let (train, val) = loader.load(self.batch_size)?;

        let info = DatasetInfo {
            files: loader.corpus().len(),
            classes: loader.nb_classes(),
            input_shape: loader.input_shape(),
            batch_size: self.batch_size,
            train_samples: train.indices().len(),
            train_batches: train.len(),
            val_samples: val.as_ref().map_or(0, |v| v.indices().len()),
            val_batches: val.as_ref().map_or(0, |v| v.len()),
            augmentation: loader.config().wav_augment.enable,
            supervised: loader.config().supervised.is_some(),
        };
        output_result(&info, cli.json)
    }
}
