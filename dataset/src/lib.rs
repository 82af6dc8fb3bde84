//! Data pipeline for self-supervised speaker-representation training.
//!
//! A manifest of `<speaker> <path>` lines becomes a [`Corpus`]. The
//! [`AudioDatasetLoader`] splits it into train and validation
//! [`AudioDatasetGenerator`]s, which yield batches of two views per utterance:
//!
//! ```no_run
//! use sslforslr_dataset::{load_config, AudioDatasetLoader};
//!
//! # fn main() -> sslforslr_dataset::Result<()> {
//! let config = load_config("configs/voxceleb1.yaml")?;
//! let loader = AudioDatasetLoader::new(config)?;
//! let (mut train, _val) = loader.load(64)?;
//! for epoch in 0..10 {
//!     for batch in train.batches() {
//!         let batch = batch?;
//!         println!("epoch {epoch}: x1 {:?}", batch.x1.shape());
//!     }
//!     train.on_epoch_end();
//! }
//! # Ok(())
//! # }
//! ```

pub mod augment;
pub mod config;
mod error;
pub mod frames;
pub mod generator;
pub mod load;
pub mod loader;
pub mod manifest;
pub mod prepare;
pub mod sampler;
mod walk;

pub use augment::{AudioAugmentation, WavAugment};
pub use config::{
    load_config, AugmentKind, DatasetConfig, NoiseCategory, SupervisedConfig, WavAugmentConfig,
};
pub use error::{DatasetError, Result};
pub use frames::sample_frames;
pub use generator::{AudioDatasetGenerator, Batch, GeneratorOptions, SampleIndex};
pub use loader::{train_test_split, AudioDatasetLoader};
pub use manifest::Corpus;
pub use prepare::split_musan;
pub use sampler::SupervisedTrainingSampler;
