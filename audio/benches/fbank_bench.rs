use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sslforslr_audio::dsp::convolve;
use sslforslr_audio::fbank::Extractor;

fn make_sine(freq_hz: f64, n_samples: usize, sample_rate: usize) -> Vec<f32> {
    (0..n_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.5 * (freq_hz * 2.0 * std::f64::consts::PI * t).sin()) as f32
        })
        .collect()
}

fn bench_mel_2s(c: &mut Criterion) {
    let extractor = Extractor::default();
    let audio = make_sine(440.0, 32000, 16000); // 2s frame

    c.bench_function("mel_spectrogram_2s", |b| {
        b.iter(|| {
            let _ = black_box(extractor.extract(black_box(&audio)));
        });
    });
}

fn bench_reverb_convolve(c: &mut Criterion) {
    let audio = make_sine(440.0, 32000, 16000);
    let rir: Vec<f32> = (0..8000).map(|i| (-(i as f32) / 800.0).exp() * 0.01).collect();

    c.bench_function("rir_convolve_2s_500ms", |b| {
        b.iter(|| {
            let _ = black_box(convolve(black_box(&audio), black_box(&rir)));
        });
    });
}

criterion_group!(benches, bench_mel_2s, bench_reverb_convolve);
criterion_main!(benches);
