use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{DatasetError, Result};
use crate::generator::SampleIndex;

/// Class-balanced index sampler for supervised training.
///
/// Each epoch caps every speaker at `nb_labels_per_spk` samples. The kept
/// samples are grouped into tuples of `per_speaker` utterances from one
/// speaker, and the tuples are shuffled. No batch receives two tuples of the
/// same speaker. The result depends only on `(seed, epoch)`.
#[derive(Debug, Clone)]
pub struct SupervisedTrainingSampler {
    /// `(corpus index, label)` of every sample the sampler may draw.
    pool: Vec<(usize, usize)>,
    batch_size: usize,
    nb_labels_per_spk: usize,
    per_speaker: usize,
    seed: u64,
}

impl SupervisedTrainingSampler {
    /// Creates a sampler over the corpus positions in `pool`, labelled by
    /// `labels` (one entry per corpus file).
    ///
    /// `per_speaker` is 1 (single indices) or 2 (same-speaker pairs).
    /// Fails with [`DatasetError::InvalidIndex`] if a pool position has no label.
    pub fn new(
        labels: &[usize],
        pool: impl IntoIterator<Item = usize>,
        batch_size: usize,
        nb_labels_per_spk: usize,
        per_speaker: usize,
        seed: u64,
    ) -> Result<Self> {
        let pool = pool
            .into_iter()
            .map(|i| match labels.get(i) {
                Some(&label) => Ok((i, label)),
                None => Err(DatasetError::InvalidIndex(format!(
                    "{i} (corpus has {})",
                    labels.len()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pool,
            batch_size: batch_size.max(1),
            nb_labels_per_spk,
            per_speaker: per_speaker.clamp(1, 2),
            seed,
        })
    }

    /// Generates the index list for `epoch`.
    pub fn sample(&self, epoch: usize) -> Vec<SampleIndex> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch as u64));

        let mut order = self.pool.clone();
        order.shuffle(&mut rng);

        let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, label) in order {
            by_label.entry(label).or_default().push(idx);
        }

        let mut groups: Vec<(usize, SampleIndex)> = Vec::new();
        for (&label, indices) in &by_label {
            let keep = round_down(indices.len().min(self.nb_labels_per_spk), self.per_speaker);
            for chunk in indices[..keep].chunks(self.per_speaker) {
                let index = match *chunk {
                    [a, b] => SampleIndex::Pair(a, b),
                    [a, ..] => SampleIndex::Single(a),
                    [] => continue,
                };
                groups.push((label, index));
            }
        }

        let mut mix: Vec<usize> = (0..groups.len()).collect();
        mix.shuffle(&mut rng);

        let mut labels_out: Vec<usize> = Vec::with_capacity(groups.len());
        let mut indices_out = Vec::with_capacity(groups.len());
        for g in mix {
            let (label, index) = groups[g];
            let batch_start = round_down(labels_out.len(), self.batch_size);
            if !labels_out[batch_start..].contains(&label) {
                labels_out.push(label);
                indices_out.push(index);
            }
        }
        indices_out
    }
}

fn round_down(n: usize, step: usize) -> usize {
    n / step * step
}
