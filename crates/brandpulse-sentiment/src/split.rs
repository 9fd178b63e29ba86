//! Seeded stratified train/held-out split.

use brandpulse_core::Sentiment;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::SentimentError;

/// Row indices of each partition, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratifiedSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition row indices so each label keeps its corpus proportion.
///
/// Per label, in [`Sentiment::ALL`] order, the label's indices are shuffled
/// with one `StdRng` seeded from `seed` and `round(count * test_fraction)` of
/// them go to the held-out side.
///
/// # Errors
///
/// Returns [`SentimentError::InsufficientData`] when a label is absent or so
/// rare that one partition would receive none of it. Nothing is returned
/// partially.
pub fn stratified_split(
    labels: &[Sentiment],
    test_fraction: f64,
    seed: u64,
) -> Result<StratifiedSplit, SentimentError> {
    let mut by_label: [Vec<usize>; Sentiment::COUNT] = Default::default();
    for (index, label) in labels.iter().enumerate() {
        by_label[label.index()].push(index);
    }

    let mut quotas = [0_usize; Sentiment::COUNT];
    for label in Sentiment::ALL {
        let count = by_label[label.index()].len();
        let test_count = held_out_count(count, test_fraction);
        if test_count == 0 || test_count >= count {
            return Err(SentimentError::InsufficientData { label, count });
        }
        quotas[label.index()] = test_count;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for (mut indices, test_count) in by_label.into_iter().zip(quotas) {
        indices.shuffle(&mut rng);
        let (held_out, kept) = indices.split_at(test_count);
        test.extend_from_slice(held_out);
        train.extend_from_slice(kept);
    }
    train.sort_unstable();
    test.sort_unstable();

    tracing::debug!(
        train = train.len(),
        test = test.len(),
        seed,
        "stratified split"
    );
    Ok(StratifiedSplit { train, test })
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn held_out_count(count: usize, test_fraction: f64) -> usize {
    (count as f64 * test_fraction).round() as usize
}
