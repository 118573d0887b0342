// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Run-Type Transformer
// ─────────────────────────────────────────────────────────────────────
//! Builds the three experimental conditions from one base sequence.
//!
//! - identity: pass-through
//! - null: caller-supplied drifted sequence, validated only
//! - shuffled: seeded permutation of the base turns, never the identity
//!   order when T > 1
//!
//! The generator is created inside each call from the explicit seed, so
//! parallel runs never share a random stream.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rcxi_types::{EmbeddingSeries, HarnessError, HarnessResult, RunConfig, RunType};

/// A bijection on turn indices: shuffled turn `i` is source turn `indices[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.indices.iter().enumerate().all(|(i, &j)| i == j)
    }

    /// Reorder `items` by this permutation.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.indices.iter().map(|&j| items[j].clone()).collect()
    }
}

/// Uniform random permutation of `0..n` drawn from a generator seeded with
/// `seed`. Identity draws are rejected and redrawn when `n > 1`.
pub fn seeded_permutation(n: usize, seed: u64) -> Permutation {
    let mut perm = Permutation::identity(n);
    if n < 2 {
        return perm;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut draws = 0u32;
    loop {
        perm.indices.shuffle(&mut rng);
        draws += 1;
        if !perm.is_identity() {
            break;
        }
        log::debug!("shuffle: identity permutation drawn for n={n}, redrawing");
    }
    log::debug!("shuffle: seed={seed} n={n} draws={draws}");
    perm
}

/// Permuted copy of `series`. Vectors are moved, never resampled.
pub fn shuffle_series(
    series: &EmbeddingSeries,
    seed: u64,
) -> HarnessResult<(EmbeddingSeries, Permutation)> {
    let perm = seeded_permutation(series.len(), seed);
    let shuffled = EmbeddingSeries::new(perm.apply(series.turns()))?;
    Ok((shuffled, perm))
}

/// Input sequence for one run, ready for the metric engine.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub run_type: RunType,
    pub series: EmbeddingSeries,
    /// Present for shuffled runs.
    pub permutation: Option<Permutation>,
}

/// Produce the input sequence for `config.run_type`.
///
/// `drifted` is the externally generated topic-drift sequence; it is
/// required for null runs and unused otherwise.
pub fn prepare_run(
    config: &RunConfig,
    base: &EmbeddingSeries,
    drifted: Option<&EmbeddingSeries>,
) -> HarnessResult<PreparedRun> {
    config.validate()?;
    match config.run_type {
        RunType::Identity => Ok(PreparedRun {
            run_type: RunType::Identity,
            series: base.clone(),
            permutation: None,
        }),
        RunType::Null => {
            let drifted = drifted.ok_or_else(|| {
                HarnessError::Configuration(
                    "null run requires a caller-supplied drifted sequence".to_string(),
                )
            })?;
            if drifted.dim() != base.dim() {
                return Err(HarnessError::ShapeMismatch {
                    turn: 0,
                    expected: base.dim(),
                    found: drifted.dim(),
                });
            }
            Ok(PreparedRun {
                run_type: RunType::Null,
                series: drifted.clone(),
                permutation: None,
            })
        }
        RunType::Shuffled => {
            let (series, perm) = shuffle_series(base, config.seed)?;
            Ok(PreparedRun {
                run_type: RunType::Shuffled,
                series,
                permutation: Some(perm),
            })
        }
    }
}
