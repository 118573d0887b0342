// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Embedding Provider Interface
// ─────────────────────────────────────────────────────────────────────
//! Embedding provider trait and a deterministic hash-based fallback.
//!
//! Real embedding models live outside the harness, behind this trait,
//! reached through [`ExternalProvider`]. The hash provider gives
//! repeatable vectors for tests and smoke runs without any model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rcxi_types::{EmbeddingSeries, HarnessError, HarnessResult};

/// Source of turn embeddings.
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier echoed into per-turn rows and summaries.
    fn name(&self) -> &str;

    /// Embed `texts` in order, one vector per turn.
    fn embed(&self, texts: &[&str]) -> HarnessResult<EmbeddingSeries>;
}

/// Deterministic pseudo-embedding: each text seeds its own generator,
/// so identical text always maps to the identical vector.
pub struct HashProvider {
    dim: usize,
}

impl HashProvider {
    pub fn new(dim: usize) -> HarnessResult<Self> {
        if dim == 0 {
            return Err(HarnessError::Configuration(
                "hash provider dimension must be >= 1".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn vector(&self, text: &str) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(fnv1a(text.trim().as_bytes()));
        (0..self.dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }
}

/// 64-bit FNV-1a; stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(PRIME))
}

impl EmbeddingProvider for HashProvider {
    fn name(&self) -> &str {
        "random-hash"
    }

    fn embed(&self, texts: &[&str]) -> HarnessResult<EmbeddingSeries> {
        EmbeddingSeries::new(texts.iter().map(|t| self.vector(t)).collect())
    }
}

type EmbedFn = Box<dyn Fn(&str) -> Vec<f64> + Send + Sync>;

/// Provider backed by a caller-supplied embedding function.
pub struct ExternalProvider {
    name: String,
    embed_fn: EmbedFn,
}

impl ExternalProvider {
    pub fn new(
        name: impl Into<String>,
        embed_fn: impl Fn(&str) -> Vec<f64> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            embed_fn: Box::new(embed_fn),
        }
    }
}

impl EmbeddingProvider for ExternalProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn embed(&self, texts: &[&str]) -> HarnessResult<EmbeddingSeries> {
        EmbeddingSeries::new(texts.iter().map(|t| (self.embed_fn)(t)).collect())
    }
}
