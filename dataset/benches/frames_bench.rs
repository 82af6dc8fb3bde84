use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sslforslr_dataset::{sample_frames, SupervisedTrainingSampler};

fn bench_sample_frames(c: &mut Criterion) {
    let audio: Vec<f32> = (0..16000 * 8).map(|i| (i as f32 * 0.01).sin()).collect();
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("sample_frames_8s_2s", |b| {
        b.iter(|| {
            let _ = black_box(sample_frames(black_box(&audio), 32000, &mut rng));
        });
    });
}

fn bench_supervised_sampler(c: &mut Criterion) {
    // VoxCeleb1 dev scale: 1211 speakers, ~120 utterances each.
    let labels: Vec<usize> = (0..1211).flat_map(|s| std::iter::repeat(s).take(120)).collect();
    let sampler = SupervisedTrainingSampler::new(&labels, 0..labels.len(), 256, 100, 2, 0).unwrap();

    c.bench_function("supervised_sampler_epoch", |b| {
        let mut epoch = 0;
        b.iter(|| {
            epoch += 1;
            black_box(sampler.sample(epoch));
        });
    });
}

criterion_group!(benches, bench_sample_frames, bench_supervised_sampler);
criterion_main!(benches);
