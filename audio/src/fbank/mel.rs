//! Window functions and HTK mel filterbank.

use std::f64::consts::PI;

/// Periodic Hamming window (the DFT-even variant used by spectrogram front-ends).
pub fn periodic_hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank over linearly spaced FFT bin frequencies.
///
/// Returns `[num_mels][n_fft / 2 + 1]`. Filters are not area-normalized.
pub fn mel_filter_bank(
    num_mels: usize,
    n_fft: usize,
    sample_rate: usize,
    f_min: f64,
    f_max: f64,
) -> Vec<Vec<f64>> {
    let n_freqs = n_fft / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;
    let bin_hz: Vec<f64> = if n_freqs > 1 {
        (0..n_freqs)
            .map(|k| k as f64 * nyquist / (n_freqs - 1) as f64)
            .collect()
    } else {
        vec![0.0]
    };

    let (m_lo, m_hi) = (hz_to_mel(f_min), hz_to_mel(f_max));
    let corners: Vec<f64> = (0..num_mels + 2)
        .map(|i| mel_to_hz(m_lo + (m_hi - m_lo) * i as f64 / (num_mels + 1) as f64))
        .collect();

    (0..num_mels)
        .map(|m| {
            let (left, center, right) = (corners[m], corners[m + 1], corners[m + 2]);
            bin_hz
                .iter()
                .map(|&f| {
                    let rise = (f - left) / (center - left);
                    let fall = (right - f) / (right - center);
                    rise.min(fall).max(0.0)
                })
                .collect()
        })
        .collect()
}
