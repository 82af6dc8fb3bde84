//! Batch generator feeding the training loop.
//!
//! The generator behaves like a fixed-length sequence of batches. It has
//! `indices.len() / batch_size` batches, and the trailing partial batch is
//! dropped. Batch `i` reads the audio behind `indices[i * B .. (i + 1) * B]`,
//! draws two frames per sample, optionally augments them and extracts mel
//! features, then stacks everything into `(x1, x2, y)` arrays.
//!
//! # Modes
//!
//! - **frame split** ([`SampleIndex::Single`]): both frames come from one
//!   file, sampled as a non-overlapping pair.
//! - **paired files** ([`SampleIndex::Pair`]): one random frame from each of
//!   two files. The label is the first file's.
//!
//! # Shapes
//!
//! | features | per sample | with clean+aug |
//! |---|---|---|
//! | waveform | `(T, 1)` | `(T, 1, 2)` |
//! | mel | `(T / 160, 40)` | `(T / 160, 40, 2)` |

use std::fmt;
use std::sync::Arc;

use ndarray::{stack, Array1, Array2, ArrayD, ArrayViewD, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sslforslr_audio::fbank::{flatten, Extractor};
use tracing::debug;

use crate::augment::WavAugment;
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::frames::sample_frames;
use crate::load::load_audio;
use crate::manifest::Corpus;
use crate::sampler::SupervisedTrainingSampler;

/// Position(s) in the corpus that make up one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleIndex {
    /// One file, split into two frames.
    Single(usize),
    /// Two files, one frame each.
    Pair(usize, usize),
}

impl fmt::Display for SampleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleIndex::Single(a) => write!(f, "{a}"),
            SampleIndex::Pair(a, b) => write!(f, "({a}, {b})"),
        }
    }
}

/// One batch: two views per sample plus the speaker labels.
#[derive(Debug, Clone)]
pub struct Batch {
    pub x1: ArrayD<f32>,
    pub x2: ArrayD<f32>,
    pub y: Array1<usize>,
}

impl Batch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Generator settings that do not depend on the corpus.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub batch_size: usize,
    pub frame_length: usize,
    pub frame_split: bool,
    pub provide_clean_and_aug: bool,
    pub extract_mfcc: bool,
    pub sample_rate: u32,
    pub seed: u64,
}

impl GeneratorOptions {
    pub fn from_config(cfg: &DatasetConfig, batch_size: usize) -> Self {
        Self {
            batch_size,
            frame_length: cfg.frame_length,
            frame_split: cfg.frame_split,
            provide_clean_and_aug: cfg.provide_clean_and_aug,
            extract_mfcc: cfg.extract_mfcc,
            sample_rate: cfg.sample_rate,
            seed: cfg.seed,
        }
    }
}

/// Sequence of augmented frame-pair batches over a shared corpus.
pub struct AudioDatasetGenerator {
    opts: GeneratorOptions,
    corpus: Arc<Corpus>,
    indices: Vec<SampleIndex>,
    wav_augment: Option<Arc<dyn WavAugment>>,
    mel: Option<Extractor>,
    epoch: usize,
    supervised_sampler: Option<SupervisedTrainingSampler>,
    rng: StdRng,
}

impl AudioDatasetGenerator {
    pub fn new(
        opts: GeneratorOptions,
        corpus: Arc<Corpus>,
        indices: Vec<SampleIndex>,
        wav_augment: Option<Arc<dyn WavAugment>>,
    ) -> Result<Self> {
        if opts.batch_size == 0 {
            return Err(DatasetError::Config("batch_size must be positive".into()));
        }
        if opts.frame_length == 0 {
            return Err(DatasetError::Config("frame_length must be positive".into()));
        }

        let mel = opts.extract_mfcc.then(Extractor::default);
        let rng = StdRng::seed_from_u64(opts.seed);
        Ok(Self {
            opts,
            corpus,
            indices,
            wav_augment,
            mel,
            epoch: 0,
            supervised_sampler: None,
            rng,
        })
    }

    /// Number of full batches.
    pub fn len(&self) -> usize {
        self.indices.len() / self.opts.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn indices(&self) -> &[SampleIndex] {
        &self.indices
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.opts
    }

    /// Shape of one sample view, without the clean/augmented axis.
    pub fn input_shape(&self) -> (usize, usize) {
        match &self.mel {
            Some(mel) => (
                mel.num_frames(self.opts.frame_length),
                mel.config().num_mels,
            ),
            None => (self.opts.frame_length, 1),
        }
    }

    /// Builds batch `i`.
    pub fn get(&mut self, i: usize) -> Result<Batch> {
        let len = self.len();
        if i >= len {
            return Err(DatasetError::BatchOutOfRange { index: i, len });
        }

        let bs = self.opts.batch_size;
        let batch_indices = self.indices[i * bs..(i + 1) * bs].to_vec();
        let corpus = Arc::clone(&self.corpus);
        let files = corpus.files();
        let labels = corpus.labels();
        let file = |idx: usize, index: SampleIndex| {
            files
                .get(idx)
                .ok_or_else(|| DatasetError::InvalidIndex(format!("{index} (corpus has {})", files.len())))
        };

        let frame_length = self.opts.frame_length;
        let sample_rate = self.opts.sample_rate;
        let mut x1 = Vec::with_capacity(bs);
        let mut x2 = Vec::with_capacity(bs);
        let mut y = Vec::with_capacity(bs);

        for index in batch_indices {
            match (self.opts.frame_split, index) {
                (true, SampleIndex::Single(idx)) => {
                    let path = file(idx, index)?;
                    let data = load_audio(path, None, 2 * frame_length, sample_rate, &mut self.rng)?;
                    let (frame1, frame2) = sample_frames(&data, frame_length, &mut self.rng)?;
                    if self.opts.provide_clean_and_aug {
                        x1.push(self.clean_and_aug(frame1)?);
                        x2.push(self.clean_and_aug(frame2)?);
                    } else {
                        x1.push(self.preprocess(frame1, true)?);
                        x2.push(self.preprocess(frame2, true)?);
                    }
                    y.push(labels[idx]);
                }
                (false, SampleIndex::Pair(a, b)) => {
                    let path1 = file(a, index)?;
                    let path2 = file(b, index)?;
                    let data1 = load_audio(path1, Some(frame_length), 0, sample_rate, &mut self.rng)?;
                    x1.push(self.preprocess(&data1, true)?);
                    let data2 = load_audio(path2, Some(frame_length), 0, sample_rate, &mut self.rng)?;
                    x2.push(self.preprocess(&data2, true)?);
                    y.push(labels[a]);
                }
                (frame_split, other) => {
                    let mode = if frame_split { "frame-split" } else { "paired" };
                    return Err(DatasetError::InvalidIndex(format!("{other} in {mode} mode")));
                }
            }
        }

        debug!(batch = i, epoch = self.epoch, size = y.len(), "built batch");
        Ok(Batch {
            x1: stack_views(&x1)?,
            x2: stack_views(&x2)?,
            y: Array1::from(y),
        })
    }

    /// Iterates over all batches of the current epoch.
    pub fn batches(&mut self) -> impl Iterator<Item = Result<Batch>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Turns one frame into model input: optional augmentation, then mel
    /// features `(T / 160, 40)` or the raw waveform as `(T, 1)`.
    pub fn preprocess(&mut self, frame: &[f32], augment: bool) -> Result<ArrayD<f32>> {
        if frame.len() != self.opts.frame_length {
            return Err(DatasetError::FrameLength {
                expected: self.opts.frame_length,
                got: frame.len(),
            });
        }

        let data = match &self.wav_augment {
            Some(aug) if augment => {
                let out = aug.augment(frame, &mut self.rng)?;
                if out.len() != frame.len() {
                    return Err(DatasetError::AugmentLength {
                        before: frame.len(),
                        after: out.len(),
                    });
                }
                out
            }
            _ => frame.to_vec(),
        };

        let array = match &self.mel {
            Some(mel) => {
                let feats = mel.extract(&data);
                Array2::from_shape_vec((feats.len(), mel.config().num_mels), flatten(&feats))?
            }
            None => Array2::from_shape_vec((data.len(), 1), data)?,
        };
        Ok(array.into_dyn())
    }

    /// Clean and augmented views stacked on a trailing axis of size 2.
    fn clean_and_aug(&mut self, frame: &[f32]) -> Result<ArrayD<f32>> {
        let clean = self.preprocess(frame, false)?;
        let aug = self.preprocess(frame, true)?;
        Ok(stack(Axis(clean.ndim()), &[clean.view(), aug.view()])?)
    }

    /// Switches to class-balanced sampling and regenerates indices for the
    /// current epoch.
    ///
    /// The sampler draws from the corpus positions this generator currently
    /// covers. Frame-split generators get single indices, paired generators
    /// get same-speaker pairs. Fails if an index lies outside the corpus.
    pub fn enable_supervision(&mut self, nb_labels_per_spk: usize) -> Result<()> {
        let mut pool: Vec<usize> = self
            .indices
            .iter()
            .flat_map(|index| match *index {
                SampleIndex::Single(a) => vec![a],
                SampleIndex::Pair(a, b) => vec![a, b],
            })
            .collect();
        pool.sort_unstable();
        pool.dedup();

        let per_speaker = if self.opts.frame_split { 1 } else { 2 };
        let sampler = SupervisedTrainingSampler::new(
            self.corpus.labels(),
            pool,
            self.opts.batch_size,
            nb_labels_per_spk,
            per_speaker,
            self.opts.seed,
        )?;
        self.indices = sampler.sample(self.epoch);
        self.supervised_sampler = Some(sampler);
        debug!(
            epoch = self.epoch,
            indices = self.indices.len(),
            "supervised sampling enabled"
        );
        Ok(())
    }

    /// Advances the epoch and reorders indices: regenerated by the supervised
    /// sampler when enabled, otherwise shuffled.
    pub fn on_epoch_end(&mut self) {
        self.epoch += 1;
        match &self.supervised_sampler {
            Some(sampler) => self.indices = sampler.sample(self.epoch),
            None => self.indices.shuffle(&mut self.rng),
        }
        debug!(epoch = self.epoch, batches = self.len(), "epoch end");
    }
}

fn stack_views(items: &[ArrayD<f32>]) -> Result<ArrayD<f32>> {
    let views: Vec<ArrayViewD<'_, f32>> = items.iter().map(|a| a.view()).collect();
    Ok(stack(Axis(0), &views)?)
}
