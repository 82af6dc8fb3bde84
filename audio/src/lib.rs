//! Audio front-end for speaker-representation training.
//!
//! This crate provides the signal-level building blocks of the data pipeline:
//!
//! - `wav`: WAV reading (mono mixdown, [-1, 1] normalization) and writing
//! - `resampler`: offline sample rate conversion via rubato
//! - `fbank`: 40-bin power mel spectrogram ("MFCC" input features)
//! - `dsp`: pre-emphasis, FFT convolution, SNR gain, wrap padding
//!
//! # Example
//!
//! ```rust
//! use sslforslr_audio::fbank::extract_mfcc;
//!
//! // 200ms of silence at 16kHz
//! let pcm = vec![0.0f32; 3200];
//! let feats = extract_mfcc(&pcm);
//! assert_eq!(feats.len(), 20);
//! assert_eq!(feats[0].len(), 40);
//! ```

pub mod dsp;
mod error;
pub mod fbank;
pub mod resampler;
pub mod wav;

pub use error::{AudioError, Result};
pub use wav::{read_wav, read_wav_at, write_wav, Pcm};
