//! Drives the generators like a training loop would.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use serde::Serialize;
use sslforslr_dataset::AudioDatasetGenerator;
use tracing::{debug, info};

use super::{open_loader, output_result, print_success};
use crate::Cli;

/// Pull batches through the train (and validation) generators.
#[derive(Args)]
pub struct IterateCommand {
    /// Dataset config (YAML)
    #[arg(long)]
    config: PathBuf,

    /// Batch size
    #[arg(short = 'b', long)]
    batch_size: usize,

    /// Stop each epoch after this many batches
    #[arg(long)]
    batches: Option<usize>,

    /// Number of epochs
    #[arg(short = 'e', long, default_value_t = 1)]
    epochs: usize,
}

#[derive(Serialize)]
struct EpochStats {
    split: &'static str,
    epoch: usize,
    batches: usize,
    samples: usize,
    x_shape: Vec<usize>,
    seconds: f64,
    batches_per_sec: f64,
}

impl IterateCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let loader = open_loader(&self.config)?;
        let (mut train, mut val) = loader.load(self.batch_size)?;
        info!(
            train_batches = train.len(),
            val_batches = val.as_ref().map_or(0, |v| v.len()),
            epochs = self.epochs,
            "iterating"
        );

        let mut stats = Vec::new();
        for _ in 0..self.epochs {
            stats.push(self.run_epoch("train", &mut train)?);
            if let Some(val) = val.as_mut() {
                stats.push(self.run_epoch("val", val)?);
            }
        }

        print_success(&format!("iterated {} epoch(s)", self.epochs));
        output_result(&stats, cli.json)
    }

    fn run_epoch(
        &self,
        split: &'static str,
        generator: &mut AudioDatasetGenerator,
    ) -> anyhow::Result<EpochStats> {
        let epoch = generator.epoch();
        let limit = self.batches.unwrap_or(usize::MAX).min(generator.len());
        let start = Instant::now();

        let mut samples = 0;
        let mut x_shape = Vec::new();
        for i in 0..limit {
            let batch_start = Instant::now();
            let batch = generator.get(i)?;
            debug!(
                split,
                epoch,
                batch = i,
                x1 = ?batch.x1.shape(),
                x2 = ?batch.x2.shape(),
                elapsed_ms = batch_start.elapsed().as_millis() as u64,
                "batch"
            );
            samples += batch.len();
            x_shape = batch.x1.shape().to_vec();
        }
        generator.on_epoch_end();

        let seconds = start.elapsed().as_secs_f64();
        info!(split, epoch, batches = limit, seconds, "epoch done");
        Ok(EpochStats {
            split,
            epoch,
            batches: limit,
            samples,
            x_shape,
            seconds,
            batches_per_sec: if seconds > 0.0 { limit as f64 / seconds } else { 0.0 },
        })
    }
}
