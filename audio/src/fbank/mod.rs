//! Mel spectrogram features for speaker-representation models.
//!
//! The default front-end is a 40-bin power mel spectrogram of 16 kHz audio.
//! Before the transform, the signal goes through a 0.97 pre-emphasis filter.
//! The output is a `[T, num_mels]` f32 matrix with `T = len / hop_length`:
//! one frame per 10 ms of input.
//!
//! Default parameters:
//! - SampleRate: 16000
//! - FFTSize: 512
//! - WindowLength: 400 (25ms, periodic Hamming, centred in the FFT frame)
//! - HopLength: 160 (10ms)
//! - NumMels: 40 (HTK scale, 0 Hz .. Nyquist)
//! - PreEmphasis: 0.97

pub mod fft;
pub mod mel;

use crate::dsp::pre_emphasis;

/// Number of input samples per output frame with the default config.
pub const HOP_LENGTH: usize = 160;
/// Number of mel bins with the default config.
pub const NUM_MELS: usize = 40;

/// Configuration for mel spectrogram extraction.
#[derive(Debug, Clone)]
pub struct Config {
    pub sample_rate: usize,
    pub n_fft: usize,
    pub win_length: usize,
    pub hop_length: usize,
    pub num_mels: usize,
    pub f_min: f64,
    /// Upper band edge; `None` means Nyquist.
    pub f_max: Option<f64>,
    /// Pre-emphasis coefficient; 0 disables it.
    pub pre_emphasis: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            n_fft: 512,
            win_length: 400,
            hop_length: HOP_LENGTH,
            num_mels: NUM_MELS,
            f_min: 0.0,
            f_max: None,
            pre_emphasis: 0.97,
        }
    }
}

/// Mel spectrogram extractor with precomputed window and filterbank.
#[derive(Debug, Clone)]
pub struct Extractor {
    cfg: Config,
    /// Window of `n_fft` taps: `win_length` Hamming taps centred, zeros around.
    window: Vec<f64>,
    mel_bank: Vec<Vec<f64>>,
}

impl Extractor {
    /// Creates an extractor for the given config.
    ///
    /// `win_length` is clamped to `n_fft`, and `n_fft` is rounded up to a power of two.
    pub fn new(mut cfg: Config) -> Self {
        cfg.n_fft = fft::next_pow2(cfg.n_fft);
        cfg.win_length = cfg.win_length.clamp(1, cfg.n_fft);
        cfg.hop_length = cfg.hop_length.max(1);

        let offset = (cfg.n_fft - cfg.win_length) / 2;
        let mut window = vec![0.0; cfg.n_fft];
        for (i, w) in mel::periodic_hamming(cfg.win_length).into_iter().enumerate() {
            window[offset + i] = w;
        }

        let f_max = cfg.f_max.unwrap_or(cfg.sample_rate as f64 / 2.0);
        let mel_bank =
            mel::mel_filter_bank(cfg.num_mels, cfg.n_fft, cfg.sample_rate, cfg.f_min, f_max);
        Self {
            cfg,
            window,
            mel_bank,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of output frames for `n` input samples.
    pub fn num_frames(&self, n: usize) -> usize {
        n / self.cfg.hop_length
    }

    /// Extracts `[len / hop_length][num_mels]` power mel features from
    /// normalized f32 PCM.
    pub fn extract(&self, pcm: &[f32]) -> Vec<Vec<f32>> {
        let num_frames = self.num_frames(pcm.len());
        if num_frames == 0 {
            return Vec::new();
        }

        let emphasized;
        let signal = if self.cfg.pre_emphasis > 0.0 {
            emphasized = pre_emphasis(pcm, self.cfg.pre_emphasis);
            &emphasized[..]
        } else {
            pcm
        };

        let nfft = self.cfg.n_fft;
        let pad = nfft / 2;
        let half = nfft / 2 + 1;
        let mut re = vec![0.0f64; nfft];
        let mut im = vec![0.0f64; nfft];
        let mut power = vec![0.0f64; half];

        let mut features = Vec::with_capacity(num_frames);
        for t in 0..num_frames {
            // Frames are centred on t * hop; the signal is reflect-extended.
            let start = (t * self.cfg.hop_length) as isize - pad as isize;
            for i in 0..nfft {
                let w = self.window[i];
                re[i] = if w == 0.0 {
                    0.0
                } else {
                    signal[reflect(start + i as isize, signal.len())] as f64 * w
                };
                im[i] = 0.0;
            }

            fft::fft(&mut re, &mut im);
            for k in 0..half {
                power[k] = re[k] * re[k] + im[k] * im[k];
            }

            let frame = self
                .mel_bank
                .iter()
                .map(|filter| {
                    filter
                        .iter()
                        .zip(&power)
                        .map(|(w, p)| w * p)
                        .sum::<f64>() as f32
                })
                .collect();
            features.push(frame);
        }
        features
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Extracts default 40-bin mel features: `[len / 160][40]`.
pub fn extract_mfcc(pcm: &[f32]) -> Vec<Vec<f32>> {
    Extractor::default().extract(pcm)
}

/// Flattens `[T][C]` row-major to `[T * C]`.
pub fn flatten(features: &[Vec<f32>]) -> Vec<f32> {
    features.iter().flat_map(|row| row.iter().copied()).collect()
}

/// Maps an index into `0..n` by mirroring at the edges without repeating them.
fn reflect(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let mut i = i.rem_euclid(period);
    if i >= n as isize {
        i = period - i;
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / 16000.0).sin() as f32)
            .collect()
    }

    #[test]
    fn test_shape_one_second() {
        let feats = extract_mfcc(&sine(440.0, 16000));
        assert_eq!(feats.len(), 100);
        assert!(feats.iter().all(|f| f.len() == 40));
        for f in &feats {
            for &v in f {
                assert!(v.is_finite() && v >= 0.0, "bad feature value {}", v);
            }
        }
    }

    #[test]
    fn test_frame_count_truncates() {
        let ex = Extractor::default();
        assert_eq!(ex.extract(&sine(440.0, 32159)).len(), 200);
        assert_eq!(ex.extract(&sine(440.0, 32160)).len(), 201);
    }

    #[test]
    fn test_energy_lands_near_tone() {
        let ex = Extractor::new(Config {
            pre_emphasis: 0.0,
            ..Config::default()
        });
        let low = ex.extract(&sine(300.0, 8000));
        let high = ex.extract(&sine(4000.0, 8000));

        let argmax = |f: &Vec<f32>| {
            f.iter()
                .enumerate()
                .fold((0, f32::MIN), |b, (i, &v)| if v > b.1 { (i, v) } else { b })
                .0
        };
        assert!(argmax(&low[20]) < argmax(&high[20]));
    }

    #[test]
    fn test_silence_is_zero() {
        let feats = extract_mfcc(&vec![0.0; 1600]);
        assert_eq!(feats.len(), 10);
        assert!(feats.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_too_short() {
        assert!(extract_mfcc(&[]).is_empty());
        assert!(extract_mfcc(&[0.1; 159]).is_empty());
    }

    #[test]
    fn test_flatten() {
        let f = vec![vec![1.0f32, 2.0], vec![3.0, 4.0]];
        assert_eq!(flatten(&f), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reflect() {
        // Signal 0..5 mirrored: ... 2 1 | 0 1 2 3 4 | 3 2 ...
        assert_eq!(reflect(-1, 5), 1);
        assert_eq!(reflect(-2, 5), 2);
        assert_eq!(reflect(5, 5), 3);
        assert_eq!(reflect(6, 5), 2);
        assert_eq!(reflect(3, 5), 3);
        assert_eq!(reflect(-7, 1), 0);
    }
}
