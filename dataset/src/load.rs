//! Reading fixed-length frames from WAV files.

use std::path::Path;

use rand::Rng;
use sslforslr_audio::dsp::wrap_pad;
use sslforslr_audio::read_wav_at;

use crate::error::Result;

/// Reads `num_frames` frames of `frame_length` samples from a WAV file.
///
/// Without a frame length the whole signal is one frame. Signals shorter than
/// the frame are first wrap-padded to `frame_length + 1` samples. A single
/// frame starts at a random offset. Several frames start at evenly spaced
/// offsets across the signal.
pub fn load_wav<R: Rng + ?Sized>(
    path: impl AsRef<Path>,
    frame_length: Option<usize>,
    num_frames: usize,
    sample_rate: u32,
    rng: &mut R,
) -> Result<Vec<Vec<f32>>> {
    let audio = read_wav_at(path, sample_rate)?.samples;
    Ok(frames_from(audio, frame_length, num_frames, rng))
}

/// Reads a whole WAV file, wrap-padded to at least `min_length` samples.
///
/// With a frame length, one random crop of that length is returned instead.
pub fn load_audio<R: Rng + ?Sized>(
    path: impl AsRef<Path>,
    frame_length: Option<usize>,
    min_length: usize,
    sample_rate: u32,
    rng: &mut R,
) -> Result<Vec<f32>> {
    let mut audio = read_wav_at(path, sample_rate)?.samples;
    if audio.len() < min_length {
        audio = wrap_pad(&audio, min_length);
    }
    match frame_length {
        None => Ok(audio),
        Some(_) => Ok(frames_from(audio, frame_length, 1, rng).swap_remove(0)),
    }
}

/// Cuts frames out of a decoded signal.
pub(crate) fn frames_from<R: Rng + ?Sized>(
    audio: Vec<f32>,
    frame_length: Option<usize>,
    num_frames: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let frame_length = frame_length.unwrap_or(audio.len());
    let audio = if audio.len() < frame_length {
        wrap_pad(&audio, frame_length + 1)
    } else {
        audio
    };

    let last = audio.len() - frame_length;
    let starts: Vec<usize> = match num_frames {
        0 => Vec::new(),
        1 => vec![rng.gen_range(0..=last)],
        n => (0..n)
            .map(|i| (last as f64 * i as f64 / (n - 1) as f64) as usize)
            .collect(),
    };

    starts
        .into_iter()
        .map(|s| audio[s..s + frame_length].to_vec())
        .collect()
}
