//! WAV file reading and writing.
//!
//! Every reader returns mono `f32` samples normalized to [-1, 1]. Multi-channel
//! files are averaged down to one channel.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{AudioError, Result};
use crate::resampler::resample;

/// Mono PCM samples with their sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Pcm {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Reads a WAV file at its native sample rate.
pub fn read_wav(path: impl AsRef<Path>) -> Result<Pcm> {
    let path = path.as_ref();
    let wav_err = |source| AudioError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(wav_err)?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(wav_err)?
        }
        (SampleFormat::Float, bits) => {
            return Err(AudioError::UnsupportedFormat { format: "float", bits });
        }
        (SampleFormat::Int, bits) => {
            return Err(AudioError::UnsupportedFormat { format: "int", bits });
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(Pcm {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Reads a WAV file and converts it to `sample_rate` if needed.
pub fn read_wav_at(path: impl AsRef<Path>, sample_rate: u32) -> Result<Pcm> {
    let pcm = read_wav(path)?;
    if pcm.sample_rate == sample_rate {
        return Ok(pcm);
    }
    let samples = resample(&pcm.samples, pcm.sample_rate, sample_rate)?;
    Ok(Pcm {
        samples,
        sample_rate,
    })
}

/// Writes mono samples as a 16-bit PCM WAV file.
///
/// Samples outside [-1, 1] are clipped.
pub fn write_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    let wav_err = |source| AudioError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(v).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(n: usize, sample_rate: u32) -> Vec<f32> {
        (0..n)
            .map(|i| {
                0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_write_read_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let samples = sine(1600, 16000);

        write_wav(&path, &samples, 16000).unwrap();
        let pcm = read_wav(&path).unwrap();

        assert_eq!(pcm.sample_rate, 16000);
        assert_eq!(pcm.len(), 1600);
        for (a, b) in pcm.samples.iter().zip(samples.iter()) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
        assert!((pcm.duration_secs() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_stereo_is_averaged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut w = WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            w.write_sample(16384i16).unwrap();
            w.write_sample(0i16).unwrap();
        }
        w.finalize().unwrap();

        let pcm = read_wav(&path).unwrap();
        assert_eq!(pcm.len(), 100);
        for &s in &pcm.samples {
            assert!((s - 0.25).abs() < 1e-4);
        }
    }

    #[test]
    fn test_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut w = WavWriter::create(&path, spec).unwrap();
        w.write_sample(0.5f32).unwrap();
        w.write_sample(-0.25f32).unwrap();
        w.finalize().unwrap();

        let pcm = read_wav(&path).unwrap();
        assert_eq!(pcm.samples, vec![0.5, -0.25]);
    }

    #[test]
    fn test_read_at_resamples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("8k.wav");
        write_wav(&path, &sine(8000, 8000), 8000).unwrap();

        let pcm = read_wav_at(&path, 16000).unwrap();
        assert_eq!(pcm.sample_rate, 16000);
        assert_eq!(pcm.len(), 16000);
    }

    #[test]
    fn test_missing_file() {
        let err = read_wav("/nonexistent/x.wav").unwrap_err();
        assert!(matches!(err, AudioError::Wav { .. }));
    }
}
