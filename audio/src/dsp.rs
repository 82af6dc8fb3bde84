//! Signal helpers used by feature extraction and augmentation.

use crate::fbank::fft;

/// Floor added to the mean power before taking the log.
const POWER_FLOOR: f32 = 1e-4;

/// First-order pre-emphasis `y[t] = x[t] - coef * x[t-1]`.
///
/// The left edge is reflect-padded, so `x[-1]` is taken as `x[1]`.
pub fn pre_emphasis(x: &[f32], coef: f32) -> Vec<f32> {
    if x.len() < 2 {
        return x.to_vec();
    }
    let mut y = Vec::with_capacity(x.len());
    y.push(x[0] - coef * x[1]);
    y.extend(x.windows(2).map(|w| w[1] - coef * w[0]));
    y
}

/// Mean power in dB: `10 * log10(mean(x^2) + 1e-4)`.
pub fn power_db(x: &[f32]) -> f32 {
    let mean = if x.is_empty() {
        0.0
    } else {
        x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32
    };
    10.0 * (mean + POWER_FLOOR).log10()
}

/// Amplitude gain that places a noise at `snr_db` below a clean signal.
pub fn snr_gain(clean_db: f32, noise_db: f32, snr_db: f32) -> f32 {
    10f32.powf((clean_db - noise_db - snr_db) / 10.0).sqrt()
}

/// Scales `x` in place to unit energy. Silent input is left untouched.
pub fn normalize_energy(x: &mut [f32]) {
    let energy: f64 = x.iter().map(|&v| v as f64 * v as f64).sum();
    if energy > 0.0 {
        let scale = (1.0 / energy.sqrt()) as f32;
        x.iter_mut().for_each(|v| *v *= scale);
    }
}

/// Repeats `x` cyclically until it is `target` samples long.
///
/// Returns `x` unchanged when it is already long enough. Empty input pads
/// with zeros.
pub fn wrap_pad(x: &[f32], target: usize) -> Vec<f32> {
    if x.len() >= target {
        return x.to_vec();
    }
    if x.is_empty() {
        return vec![0.0; target];
    }
    x.iter().copied().cycle().take(target).collect()
}

/// Full linear convolution of `signal` and `kernel` (length `n + m - 1`), via FFT.
pub fn convolve(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }
    let out_len = signal.len() + kernel.len() - 1;
    let n = fft::next_pow2(out_len);

    let mut a_re: Vec<f64> = signal.iter().map(|&v| v as f64).collect();
    a_re.resize(n, 0.0);
    let mut a_im = vec![0.0; n];
    let mut b_re: Vec<f64> = kernel.iter().map(|&v| v as f64).collect();
    b_re.resize(n, 0.0);
    let mut b_im = vec![0.0; n];

    fft::fft(&mut a_re, &mut a_im);
    fft::fft(&mut b_re, &mut b_im);
    for k in 0..n {
        let re = a_re[k] * b_re[k] - a_im[k] * b_im[k];
        let im = a_re[k] * b_im[k] + a_im[k] * b_re[k];
        a_re[k] = re;
        a_im[k] = im;
    }
    fft::ifft(&mut a_re, &mut a_im);

    a_re[..out_len].iter().map(|&v| v as f32).collect()
}
