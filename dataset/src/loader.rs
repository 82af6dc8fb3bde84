//! Builds train and validation generators from a [`DatasetConfig`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::augment::{AudioAugmentation, WavAugment};
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::generator::{AudioDatasetGenerator, GeneratorOptions, SampleIndex};
use crate::manifest::Corpus;

/// Seed of the train/validation split. The held-out set does not depend on
/// the configured `seed`, which only orders the samples within each side.
const SPLIT_SEED: u64 = 0;

/// Loads the corpus once and hands out generators over it.
pub struct AudioDatasetLoader {
    config: DatasetConfig,
    corpus: Arc<Corpus>,
    wav_augment: Option<Arc<dyn WavAugment>>,
}

impl AudioDatasetLoader {
    /// Validates the config, discovers augmentation sources when enabled and
    /// reads the manifest.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;

        let wav_augment: Option<Arc<dyn WavAugment>> = if config.wav_augment.enable {
            let aug =
                AudioAugmentation::new(&config.wav_augment, &config.base_path, config.sample_rate)?;
            Some(Arc::new(aug))
        } else {
            None
        };

        let corpus = Corpus::load(&config.train, &config.base_path)?;
        Ok(Self {
            config,
            corpus: Arc::new(corpus),
            wav_augment,
        })
    }

    /// Replaces the augmentation, e.g. with a custom [`WavAugment`].
    pub fn with_augment(mut self, wav_augment: Option<Arc<dyn WavAugment>>) -> Self {
        self.wav_augment = wav_augment;
        self
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn nb_classes(&self) -> usize {
        self.corpus.nb_classes()
    }

    pub fn input_shape(&self) -> (usize, usize) {
        self.config.input_shape()
    }

    /// Returns the training generator and, when `val_ratio` is set, the
    /// validation generator. Their index sets are disjoint.
    pub fn load(
        &self,
        batch_size: usize,
    ) -> Result<(AudioDatasetGenerator, Option<AudioDatasetGenerator>)> {
        let total = self.corpus.len();
        let count = match self.config.max_samples {
            Some(max) if max > total => {
                warn!(max_samples = max, corpus = total, "max_samples exceeds corpus, clamping");
                total
            }
            Some(max) => max,
            None => total,
        };

        let indices: Vec<usize> = (0..count).collect();
        let (mut train, mut val) = match self.config.val_ratio {
            Some(ratio) => {
                let (train, val) = train_test_split(indices, ratio, SPLIT_SEED);
                (train, Some(val))
            }
            None => (indices, None),
        };

        if train.is_empty() {
            return Err(DatasetError::Config(format!(
                "no training samples left ({count} samples, val_ratio {:?})",
                self.config.val_ratio
            )));
        }
        if val.as_ref().is_some_and(Vec::is_empty) {
            return Err(DatasetError::Config(format!(
                "val_ratio {:?} leaves no validation samples out of {count}",
                self.config.val_ratio
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        train.shuffle(&mut rng);
        if let Some(val) = val.as_mut() {
            val.shuffle(&mut rng);
        }

        info!(
            train = train.len(),
            val = val.as_ref().map_or(0, Vec::len),
            classes = self.nb_classes(),
            batch_size,
            "dataset split"
        );

        let opts = GeneratorOptions::from_config(&self.config, batch_size);
        let train_gen = self.generator(opts.clone(), train)?;
        let val_gen = match val {
            Some(val) => {
                let opts = GeneratorOptions {
                    seed: opts.seed.wrapping_add(1),
                    ..opts
                };
                Some(self.generator(opts, val)?)
            }
            None => None,
        };
        Ok((train_gen, val_gen))
    }

    fn generator(&self, opts: GeneratorOptions, indices: Vec<usize>) -> Result<AudioDatasetGenerator> {
        let indices = indices.into_iter().map(SampleIndex::Single).collect();
        let mut generator = AudioDatasetGenerator::new(
            opts,
            Arc::clone(&self.corpus),
            indices,
            self.wav_augment.clone(),
        )?;
        if let Some(sup) = &self.config.supervised {
            generator.enable_supervision(sup.nb_labels_per_spk)?;
        }
        Ok(generator)
    }
}

/// Seeded random split. `ceil(ratio * n)` items go to the second half.
pub fn train_test_split<T>(mut items: Vec<T>, ratio: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let n = items.len();
    let n_val = ((ratio * n as f64).ceil() as usize).min(n);
    items.shuffle(&mut StdRng::seed_from_u64(seed));
    let val = items.split_off(n - n_val);
    (items, val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupervisedConfig;
    use sslforslr_audio::write_wav;
    use std::collections::HashSet;
    use std::path::Path;

    fn fixture(dir: &Path, n: usize) -> DatasetConfig {
        let mut manifest = String::new();
        for i in 0..n {
            let rel = format!("spk{}/{i}.wav", i % 4);
            let path = dir.join(&rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            write_wav(&path, &vec![0.1; 1200], 16000).unwrap();
            manifest.push_str(&format!("spk{} {rel}\n", i % 4));
        }
        std::fs::write(dir.join("train.txt"), manifest).unwrap();

        let yaml = format!(
            "train: {}\nbase_path: {}\nframe_length: 400\n",
            dir.join("train.txt").display(),
            dir.display()
        );
        DatasetConfig::from_yaml(&yaml).unwrap()
    }

    fn firsts(generator: &AudioDatasetGenerator) -> Vec<usize> {
        generator
            .indices()
            .iter()
            .map(|i| match *i {
                SampleIndex::Single(a) | SampleIndex::Pair(a, _) => a,
            })
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let (train, val) = train_test_split((0..10).collect::<Vec<_>>(), 0.25, 0);
        assert_eq!(train.len(), 7);
        assert_eq!(val.len(), 3);

        let all: HashSet<i32> = train.iter().chain(&val).copied().collect();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_load_without_validation() {
        let dir = tempfile::tempdir().unwrap();
        let loader = AudioDatasetLoader::new(fixture(dir.path(), 8)).unwrap();
        assert_eq!(loader.nb_classes(), 4);
        assert_eq!(loader.input_shape(), (400, 1));

        let (train, val) = loader.load(3).unwrap();
        assert!(val.is_none());
        assert_eq!(train.len(), 2);

        let mut seen = firsts(&train);
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_train_val_disjoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 20);
        cfg.val_ratio = Some(0.2);
        let loader = AudioDatasetLoader::new(cfg).unwrap();

        let (train, val) = loader.load(2).unwrap();
        let val = val.unwrap();
        let train_idx: HashSet<usize> = firsts(&train).into_iter().collect();
        let val_idx: HashSet<usize> = firsts(&val).into_iter().collect();
        assert_eq!(val_idx.len(), 4);
        assert_eq!(train_idx.len(), 16);
        assert!(train_idx.is_disjoint(&val_idx));
        assert_eq!(train_idx.union(&val_idx).count(), 20);
    }

    #[test]
    fn test_val_set_independent_of_seed() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 20);
        cfg.val_ratio = Some(0.2);

        let val_set = |seed: u64| -> HashSet<usize> {
            let mut cfg = cfg.clone();
            cfg.seed = seed;
            let loader = AudioDatasetLoader::new(cfg).unwrap();
            let (_, val) = loader.load(2).unwrap();
            firsts(&val.unwrap()).into_iter().collect()
        };
        assert_eq!(val_set(0), val_set(1));
        assert_eq!(val_set(0), val_set(42));
    }

    #[test]
    fn test_seed_orders_training_samples() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture(dir.path(), 20);
        let order = |seed: u64| {
            let mut cfg = cfg.clone();
            cfg.seed = seed;
            let (train, _) = AudioDatasetLoader::new(cfg).unwrap().load(2).unwrap();
            firsts(&train)
        };
        assert_eq!(order(3), order(3));
        assert_ne!(order(3), order(4));
    }

    #[test]
    fn test_empty_split_side_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 1);
        cfg.val_ratio = Some(0.5);
        let loader = AudioDatasetLoader::new(cfg).unwrap();
        assert!(matches!(loader.load(1), Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_empty_corpus_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 0);
        let loader = AudioDatasetLoader::new(cfg.clone()).unwrap();
        assert!(matches!(loader.load(1), Err(DatasetError::Config(_))));

        cfg.val_ratio = Some(0.1);
        let loader = AudioDatasetLoader::new(cfg).unwrap();
        assert!(matches!(loader.load(1), Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_max_samples() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 10);
        cfg.max_samples = Some(6);
        let loader = AudioDatasetLoader::new(cfg.clone()).unwrap();
        let (train, _) = loader.load(1).unwrap();
        assert!(firsts(&train).iter().all(|&i| i < 6));
        assert_eq!(train.len(), 6);

        cfg.max_samples = Some(100);
        let loader = AudioDatasetLoader::new(cfg).unwrap();
        let (train, _) = loader.load(1).unwrap();
        assert_eq!(train.len(), 10);
    }

    #[test]
    fn test_supervised_generators_stay_in_split() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 24);
        cfg.val_ratio = Some(0.25);
        cfg.supervised = Some(SupervisedConfig {
            nb_labels_per_spk: 100,
        });
        let loader = AudioDatasetLoader::new(cfg).unwrap();

        let (train, val) = loader.load(2).unwrap();
        let val = val.unwrap();
        let train_idx: HashSet<usize> = firsts(&train).into_iter().collect();
        let val_idx: HashSet<usize> = firsts(&val).into_iter().collect();
        assert!(!train_idx.is_empty() && !val_idx.is_empty());
        assert!(train_idx.is_disjoint(&val_idx));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path(), 1);
        cfg.train = dir.path().join("missing.txt");
        assert!(matches!(
            AudioDatasetLoader::new(cfg),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_batches_from_loader() {
        let dir = tempfile::tempdir().unwrap();
        let loader = AudioDatasetLoader::new(fixture(dir.path(), 4)).unwrap();
        let (mut train, _) = loader.load(2).unwrap();
        let batches: Vec<_> = train.batches().collect::<Result<_>>().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].x1.shape(), &[2, 400, 1]);
    }
}
