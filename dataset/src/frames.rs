use rand::Rng;

use crate::error::{DatasetError, Result};

/// Picks two non-overlapping frames of `frame_length` samples from `audio`.
///
/// A random gap `dist` in `[0, len - 2 * frame_length]` separates the frames.
/// They sit symmetrically around a random pivot: the first frame ends
/// `dist / 2` before it, and the second starts `dist / 2` after it.
///
/// Fails if `audio` is shorter than `2 * frame_length`. Callers load audio
/// with that minimum length.
pub fn sample_frames<'a, R: Rng + ?Sized>(
    audio: &'a [f32],
    frame_length: usize,
    rng: &mut R,
) -> Result<(&'a [f32], &'a [f32])> {
    let (first, second) = sample_frame_ranges(audio.len(), frame_length, rng)?;
    Ok((&audio[first.0..first.1], &audio[second.0..second.1]))
}

/// Start/end offsets of the two frames for a buffer of `len` samples.
pub fn sample_frame_ranges<R: Rng + ?Sized>(
    len: usize,
    frame_length: usize,
    rng: &mut R,
) -> Result<((usize, usize), (usize, usize))> {
    let need = 2 * frame_length;
    if len < need {
        return Err(DatasetError::AudioTooShort { need, got: len });
    }

    let dist = rng.gen_range(0..=len - need);
    let half = dist / 2;

    let lower = frame_length + half;
    let upper = len - (frame_length + half);
    let pivot = rng.gen_range(lower..=upper);

    let first = (pivot - half - frame_length, pivot - half);
    let second = (pivot + half, pivot + half + frame_length);
    Ok((first, second))
}
