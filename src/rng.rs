//! Seeded random source
//!
//! Every random draw in the crate goes through `SeededRng`, so a match or a
//! training generation replays exactly from its seed.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random source keyed by an explicit 64-bit seed
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this stream was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream seed from a base seed and stream indices.
    /// Stable across runs: the same inputs always give the same seed.
    pub fn derive_seed(base: u64, streams: &[u64]) -> u64 {
        streams
            .iter()
            .fold(splitmix64(base), |acc, &s| splitmix64(acc ^ splitmix64(s.wrapping_add(1))))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform in [0.0, 1.0)
    pub fn uniform(&mut self) -> f64 {
        self.inner.r#gen::<f64>()
    }

    pub fn uniform_f32(&mut self) -> f32 {
        self.inner.r#gen::<f32>()
    }

    /// Bernoulli trial: true with probability `p`, clamped to [0, 1]
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform in [lo, hi); `lo` when the range is empty
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo { self.inner.gen_range(lo..hi) } else { lo }
    }

    /// Standard normal sample (Box-Muller)
    pub fn gaussian(&mut self) -> f64 {
        let u1 = self.uniform().max(1e-12);
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
