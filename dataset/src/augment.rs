//! Waveform augmentation.
//!
//! The generator treats augmentation as a black box: a [`WavAugment`] takes a
//! waveform and returns one of the same length. [`AudioAugmentation`] is the
//! stock implementation. It adds MUSAN noise, music or babble at a random SNR,
//! or it convolves the signal with a simulated room impulse response.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use sslforslr_audio::dsp::{convolve, normalize_energy, power_db, snr_gain};
use sslforslr_audio::read_wav_at;
use tracing::{debug, info, warn};

use crate::config::{AugmentKind, WavAugmentConfig};
use crate::error::{DatasetError, Result};
use crate::load::load_audio;
use crate::walk::find_wavs;

/// A waveform-to-waveform transform applied to training frames.
pub trait WavAugment: Send + Sync {
    /// Returns an augmented copy of `audio` with the same length.
    fn augment(&self, audio: &[f32], rng: &mut dyn RngCore) -> Result<Vec<f32>>;
}

impl<F> WavAugment for F
where
    F: Fn(&[f32], &mut dyn RngCore) -> Result<Vec<f32>> + Send + Sync,
{
    fn augment(&self, audio: &[f32], rng: &mut dyn RngCore) -> Result<Vec<f32>> {
        self(audio, rng)
    }
}

/// MUSAN and RIR based augmentation.
pub struct AudioAugmentation {
    cfg: WavAugmentConfig,
    sample_rate: u32,
    kinds: Vec<AugmentKind>,
    noises: HashMap<AugmentKind, Vec<PathBuf>>,
    rirs: Vec<PathBuf>,
}

impl AudioAugmentation {
    /// Discovers sources under `base_path` (`musan_path/{noise,speech,music}`
    /// and `rir_path`).
    pub fn new(cfg: &WavAugmentConfig, base_path: impl AsRef<Path>, sample_rate: u32) -> Result<Self> {
        let base_path = base_path.as_ref();
        let musan = base_path.join(&cfg.musan_path);

        let mut noises = HashMap::new();
        for kind in [AugmentKind::Noise, AugmentKind::Speech, AugmentKind::Music] {
            if let Some(dir) = kind.musan_dir() {
                noises.insert(kind, find_wavs(&musan.join(dir))?);
            }
        }
        let rirs = find_wavs(&base_path.join(&cfg.rir_path))?;

        Self::from_sources(cfg, sample_rate, noises, rirs)
    }

    /// Builds the augmentation from explicit source lists.
    ///
    /// Configured kinds without sources are dropped. It is an error if none
    /// remain, or if the probability or a SNR/count range is invalid.
    pub fn from_sources(
        cfg: &WavAugmentConfig,
        sample_rate: u32,
        noises: HashMap<AugmentKind, Vec<PathBuf>>,
        rirs: Vec<PathBuf>,
    ) -> Result<Self> {
        cfg.validate()?;

        let mut kinds = Vec::with_capacity(cfg.kinds.len());
        for &kind in &cfg.kinds {
            let available = match kind {
                AugmentKind::Reverb => rirs.len(),
                other => noises.get(&other).map_or(0, Vec::len),
            };
            if available == 0 {
                warn!(?kind, "no source files, augmentation disabled");
            } else if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if kinds.is_empty() {
            return Err(DatasetError::NoAugmentSources(format!(
                "none of {:?} has source files",
                cfg.kinds
            )));
        }

        info!(
            ?kinds,
            rirs = rirs.len(),
            noise = noises.get(&AugmentKind::Noise).map_or(0, Vec::len),
            speech = noises.get(&AugmentKind::Speech).map_or(0, Vec::len),
            music = noises.get(&AugmentKind::Music).map_or(0, Vec::len),
            "augmentation ready"
        );

        Ok(Self {
            cfg: cfg.clone(),
            sample_rate,
            kinds,
            noises,
            rirs,
        })
    }

    /// Augmentation kinds that have sources.
    pub fn kinds(&self) -> &[AugmentKind] {
        &self.kinds
    }

    /// Applies one specific augmentation.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        kind: AugmentKind,
        audio: &[f32],
        rng: &mut R,
    ) -> Result<Vec<f32>> {
        match kind {
            AugmentKind::Reverb => self.reverberate(audio, rng),
            other => self.additive_noise(other, audio, rng),
        }
    }

    fn additive_noise<R: Rng + ?Sized>(
        &self,
        kind: AugmentKind,
        audio: &[f32],
        rng: &mut R,
    ) -> Result<Vec<f32>> {
        let (Some(cat), Some(files)) = (self.cfg.category(kind), self.noises.get(&kind)) else {
            return Ok(audio.to_vec());
        };

        let clean_db = power_db(audio);
        let count = rng.gen_range(cat.count[0]..=cat.count[1]);
        let picked: Vec<&PathBuf> = files.choose_multiple(rng, count).collect();

        let mut out = audio.to_vec();
        for path in picked {
            let noise = load_audio(path, Some(audio.len()), 0, self.sample_rate, rng)?;
            let snr = rng.gen_range(cat.snr[0]..=cat.snr[1]);
            let gain = snr_gain(clean_db, power_db(&noise), snr);
            debug!(?kind, path = %path.display(), snr, "mixing noise");
            for (o, n) in out.iter_mut().zip(&noise) {
                *o += gain * n;
            }
        }
        Ok(out)
    }

    fn reverberate<R: Rng + ?Sized>(&self, audio: &[f32], rng: &mut R) -> Result<Vec<f32>> {
        let Some(path) = self.rirs.choose(rng) else {
            return Ok(audio.to_vec());
        };
        let mut rir = read_wav_at(path, self.sample_rate)?.samples;
        normalize_energy(&mut rir);

        let mut out = convolve(audio, &rir);
        out.truncate(audio.len());
        Ok(out)
    }
}

impl WavAugment for AudioAugmentation {
    fn augment(&self, audio: &[f32], rng: &mut dyn RngCore) -> Result<Vec<f32>> {
        if audio.is_empty() || !rng.gen_bool(self.cfg.probability) {
            return Ok(audio.to_vec());
        }
        let kind = self.kinds[rng.gen_range(0..self.kinds.len())];
        self.apply(kind, audio, rng)
    }
}
