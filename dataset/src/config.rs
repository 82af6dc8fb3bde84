//! Dataset configuration.
//!
//! Configuration is read from YAML. Only `train` and `frame_length` are
//! required; every other field has a default.
//!
//! ```yaml
//! train: lists/voxceleb1_train.txt
//! base_path: /data
//! frame_length: 32000
//! val_ratio: 0.1
//! wav_augment:
//!   enable: true
//!   kinds: [reverb, noise]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Top-level dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Manifest file with one `<label> <relative_path>` per line.
    pub train: PathBuf,

    /// Root joined to manifest paths and augmentation directories.
    #[serde(default)]
    pub base_path: PathBuf,

    /// Frame length in samples.
    pub frame_length: usize,

    /// Take both frames of a pair from one file (true) or from two files (false).
    #[serde(default = "default_true")]
    pub frame_split: bool,

    /// Use only the first `max_samples` manifest entries.
    #[serde(default)]
    pub max_samples: Option<usize>,

    /// Fraction of samples held out for validation.
    #[serde(default)]
    pub val_ratio: Option<f64>,

    /// Emit clean and augmented views of each frame (frame-split mode).
    #[serde(default)]
    pub provide_clean_and_aug: bool,

    /// Emit mel features instead of raw waveforms.
    #[serde(default)]
    pub extract_mfcc: bool,

    /// Sample rate every file is converted to.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Seed for shuffling, splitting and frame sampling.
    #[serde(default)]
    pub seed: u64,

    /// Class-balanced sampling for the training generator.
    #[serde(default)]
    pub supervised: Option<SupervisedConfig>,

    #[serde(default)]
    pub wav_augment: WavAugmentConfig,
}

/// Settings for the supervised class-balanced sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisedConfig {
    /// Maximum number of samples drawn per speaker and epoch.
    #[serde(default = "default_labels_per_spk")]
    pub nb_labels_per_spk: usize,
}

/// Waveform augmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WavAugmentConfig {
    pub enable: bool,
    /// MUSAN segments directory, relative to `base_path`.
    pub musan_path: PathBuf,
    /// Room impulse responses directory, relative to `base_path`.
    pub rir_path: PathBuf,
    /// Probability that a waveform is augmented at all.
    pub probability: f64,
    /// Augmentations to choose from, uniformly.
    pub kinds: Vec<AugmentKind>,
    pub noise: NoiseCategory,
    pub speech: NoiseCategory,
    pub music: NoiseCategory,
}

impl Default for WavAugmentConfig {
    fn default() -> Self {
        Self {
            enable: false,
            musan_path: PathBuf::from("musan_split"),
            rir_path: PathBuf::from("simulated_rirs"),
            probability: 1.0,
            kinds: vec![
                AugmentKind::Reverb,
                AugmentKind::Music,
                AugmentKind::Speech,
                AugmentKind::Noise,
            ],
            noise: NoiseCategory {
                snr: [0.0, 15.0],
                count: [1, 1],
            },
            speech: NoiseCategory {
                snr: [13.0, 20.0],
                count: [3, 7],
            },
            music: NoiseCategory {
                snr: [5.0, 15.0],
                count: [1, 1],
            },
        }
    }
}

impl WavAugmentConfig {
    /// Checks the probability and the SNR and count ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DatasetError::Config(msg));

        if !(0.0..=1.0).contains(&self.probability) {
            return invalid(format!(
                "wav_augment.probability must be in [0, 1], got {}",
                self.probability
            ));
        }
        for (name, cat) in [("noise", &self.noise), ("speech", &self.speech), ("music", &self.music)] {
            let [lo, hi] = cat.snr;
            if !(lo.is_finite() && hi.is_finite()) {
                return invalid(format!("wav_augment.{name}.snr must be finite, got [{lo}, {hi}]"));
            }
            if lo > hi {
                return invalid(format!("wav_augment.{name}.snr: min > max"));
            }
            if cat.count[0] > cat.count[1] {
                return invalid(format!("wav_augment.{name}.count: min > max"));
            }
        }
        Ok(())
    }

    /// Mixing parameters of an additive category.
    pub fn category(&self, kind: AugmentKind) -> Option<&NoiseCategory> {
        match kind {
            AugmentKind::Noise => Some(&self.noise),
            AugmentKind::Speech => Some(&self.speech),
            AugmentKind::Music => Some(&self.music),
            AugmentKind::Reverb => None,
        }
    }
}

/// An augmentation applied to a waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AugmentKind {
    /// Convolution with a room impulse response.
    Reverb,
    /// Additive MUSAN music.
    Music,
    /// Additive MUSAN babble (several overlapping speakers).
    Speech,
    /// Additive MUSAN noise.
    Noise,
}

impl AugmentKind {
    /// MUSAN subdirectory holding the sources of an additive kind.
    pub fn musan_dir(self) -> Option<&'static str> {
        match self {
            AugmentKind::Reverb => None,
            AugmentKind::Music => Some("music"),
            AugmentKind::Speech => Some("speech"),
            AugmentKind::Noise => Some("noise"),
        }
    }
}

/// SNR range (dB) and number of sources mixed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseCategory {
    pub snr: [f32; 2],
    pub count: [usize; 2],
}

fn default_true() -> bool {
    true
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_labels_per_spk() -> usize {
    100
}

impl DatasetConfig {
    /// Parses a YAML document. `max_samples: 0` means no limit.
    pub fn from_yaml(s: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let mut cfg: DatasetConfig = serde_yaml::from_str(s)?;
        if cfg.max_samples == Some(0) {
            cfg.max_samples = None;
        }
        Ok(cfg)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DatasetError::Config(msg));

        if self.frame_length == 0 {
            return invalid("frame_length must be positive".into());
        }
        if self.sample_rate == 0 {
            return invalid("sample_rate must be positive".into());
        }
        if let Some(r) = self.val_ratio {
            if !(r > 0.0 && r < 1.0) {
                return invalid(format!("val_ratio must be in (0, 1), got {r}"));
            }
        }
        match &self.supervised {
            Some(s) if s.nb_labels_per_spk == 0 => {
                return invalid("supervised.nb_labels_per_spk must be positive".into());
            }
            None if !self.frame_split => {
                return invalid("frame_split: false needs supervised sampling to form pairs".into());
            }
            _ => {}
        }
        if self.provide_clean_and_aug && !self.frame_split {
            return invalid("provide_clean_and_aug is only supported with frame_split".into());
        }

        self.wav_augment.validate()
    }

    /// Input shape of one sample: `(frames, channels)`.
    pub fn input_shape(&self) -> (usize, usize) {
        if self.extract_mfcc {
            (
                self.frame_length / sslforslr_audio::fbank::HOP_LENGTH,
                sslforslr_audio::fbank::NUM_MELS,
            )
        } else {
            (self.frame_length, 1)
        }
    }
}

/// Loads and validates a YAML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<DatasetConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    let cfg = DatasetConfig::from_yaml(&content).map_err(|source| DatasetError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_defaults() {
        let cfg = DatasetConfig::from_yaml("train: list.txt\nframe_length: 32000\n").unwrap();
        cfg.validate().unwrap();

        assert_eq!(cfg.train, PathBuf::from("list.txt"));
        assert!(cfg.frame_split);
        assert_eq!(cfg.sample_rate, 16000);
        assert_eq!(cfg.val_ratio, None);
        assert!(!cfg.wav_augment.enable);
        assert_eq!(cfg.wav_augment.kinds.len(), 4);
        assert_eq!(cfg.wav_augment.speech.count, [3, 7]);
        assert_eq!(cfg.input_shape(), (32000, 1));
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
train: lists/train.txt
base_path: /data
frame_length: 16000
frame_split: false
max_samples: 0
val_ratio: 0.2
extract_mfcc: true
seed: 7
supervised: {}
wav_augment:
  enable: true
  probability: 0.5
  kinds: [reverb, noise]
  noise: { snr: [0.0, 5.0], count: [1, 2] }
"#;
        let cfg = DatasetConfig::from_yaml(yaml).unwrap();
        cfg.validate().unwrap();

        assert!(!cfg.frame_split);
        assert_eq!(cfg.max_samples, None);
        assert_eq!(cfg.supervised.as_ref().unwrap().nb_labels_per_spk, 100);
        assert_eq!(cfg.wav_augment.kinds, vec![AugmentKind::Reverb, AugmentKind::Noise]);
        assert_eq!(cfg.wav_augment.noise.count, [1, 2]);
        assert_eq!(cfg.wav_augment.music.snr, [5.0, 15.0]);
        assert_eq!(cfg.input_shape(), (100, 40));
    }

    #[test]
    fn test_invalid_ratio() {
        let cfg = DatasetConfig::from_yaml("train: a\nframe_length: 10\nval_ratio: 1.0\n").unwrap();
        assert!(matches!(cfg.validate(), Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_paired_mode_needs_supervision() {
        let cfg = DatasetConfig::from_yaml("train: a\nframe_length: 10\nframe_split: false\n").unwrap();
        assert!(matches!(cfg.validate(), Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_invalid_snr_range() {
        let yaml = "train: a\nframe_length: 10\nwav_augment:\n  music: { snr: [9.0, 1.0], count: [1, 1] }\n";
        let cfg = DatasetConfig::from_yaml(yaml).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_non_finite_snr_rejected() {
        let yaml = "train: a\nframe_length: 10\nwav_augment:\n  noise: { snr: [.nan, 5.0], count: [1, 1] }\n";
        let cfg = DatasetConfig::from_yaml(yaml).unwrap();
        assert!(cfg.wav_augment.noise.snr[0].is_nan());
        assert!(matches!(cfg.validate(), Err(DatasetError::Config(_))));

        let mut aug = WavAugmentConfig::default();
        aug.music.snr = [0.0, f32::INFINITY];
        assert!(aug.validate().is_err());
    }

    #[test]
    fn test_probability_out_of_range() {
        let aug = WavAugmentConfig {
            probability: 1.5,
            ..WavAugmentConfig::default()
        };
        assert!(matches!(aug.validate(), Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = "train: a\nframe_length: 10\nwav_augment:\n  kinds: [echo]\n";
        assert!(DatasetConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(&path, "train: t.txt\nframe_length: 0\n").unwrap();
        assert!(matches!(load_config(&path), Err(DatasetError::Config(_))));

        let missing = load_config(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(DatasetError::Io { .. })));
    }
}
