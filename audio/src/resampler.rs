//! Offline sample rate conversion backed by rubato.
//!
//! Whole signals are pushed through an FFT resampler in fixed-size chunks.
//! The resampler's output delay is trimmed, and the result is cut to
//! `len * to / from` samples, so callers get an aligned signal of the
//! expected length.

use rubato::{FftFixedInOut, Resampler};

use crate::error::{AudioError, Result};

/// Frames per rubato processing block.
const CHUNK_SIZE: usize = 1024;

/// Resamples a mono signal from `from` Hz to `to` Hz.
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>> {
    if from == 0 {
        return Err(AudioError::InvalidSampleRate(from));
    }
    if to == 0 {
        return Err(AudioError::InvalidSampleRate(to));
    }
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedInOut::<f32>::new(from as usize, to as usize, CHUNK_SIZE, 1)?;
    let delay = resampler.output_delay();
    let expected = (samples.len() as u64 * to as u64 / from as u64) as usize;

    let mut out = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut pos = 0;
    loop {
        let need = resampler.input_frames_next();
        if pos + need > samples.len() {
            break;
        }
        let block_in: [&[f32]; 1] = [&samples[pos..pos + need]];
        let block = resampler.process(&block_in[..], None)?;
        out.extend_from_slice(&block[0]);
        pos += need;
    }

    if pos < samples.len() {
        let tail: [&[f32]; 1] = [&samples[pos..]];
        let block = resampler.process_partial(Some(&tail[..]), None)?;
        out.extend_from_slice(&block[0]);
    }

    // Flush until the delayed tail is out.
    while out.len() < expected + delay {
        let flush: Option<&[Vec<f32>]> = None;
        let block = resampler.process_partial(flush, None)?;
        if block[0].is_empty() {
            break;
        }
        out.extend_from_slice(&block[0]);
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, n: usize, sample_rate: u32) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_same_rate_is_copy() {
        let s = tone(440.0, 100, 16000);
        assert_eq!(resample(&s, 16000, 16000).unwrap(), s);
    }

    #[test]
    fn test_resample_length() {
        let s = tone(440.0, 4410, 44100);
        let out = resample(&s, 44100, 16000).unwrap();
        assert_eq!(out.len(), 1600);
    }

    #[test]
    fn test_downsample_preserves_level() {
        let s = tone(200.0, 48000, 48000);
        let out = resample(&s, 48000, 16000).unwrap();
        assert_eq!(out.len(), 16000);

        // Away from the edges the tone keeps roughly unit amplitude.
        let peak = out[4000..12000].iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(peak > 0.9 && peak < 1.1, "peak = {}", peak);
    }

    #[test]
    fn test_short_input() {
        let s = vec![0.1f32; 10];
        let out = resample(&s, 8000, 16000).unwrap();
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn test_zero_rate() {
        assert!(matches!(
            resample(&[0.0], 0, 16000),
            Err(AudioError::InvalidSampleRate(0))
        ));
    }
}
