//! Draw helpers over the per-task generator.
//!
//! Every random decision goes through an explicitly passed [`SynthRng`]; nothing in the crate
//! touches a process-wide generator.

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::error::{SynthError, SynthResult};

/// The generator threaded through every `sample` call.
pub type SynthRng = StdRng;

/// Build the generator owned by one task from its 128-bit seed.
pub fn rng_from_seed(seed: u128) -> SynthRng {
    let half = seed.to_le_bytes();
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(&half);
    bytes[16..].copy_from_slice(&half);
    StdRng::from_seed(bytes)
}

/// Uniform draw in `[lo, hi)`; returns `lo` when the range is empty.
pub fn uniform(rng: &mut SynthRng, (lo, hi): (f64, f64)) -> f64 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

/// Uniform integer draw in `[lo, hi]`; returns `lo` when `hi < lo`.
pub fn int_inclusive(rng: &mut SynthRng, (lo, hi): (i64, i64)) -> i64 {
    if lo < hi { rng.random_range(lo..=hi) } else { lo }
}

/// Bernoulli draw with success probability `p`.
pub fn chance(rng: &mut SynthRng, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Normal draw via Box-Muller.
pub fn normal(rng: &mut SynthRng, mean: f64, std: f64) -> f64 {
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    mean + std * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Fresh 64-bit seed for pixel-level randomness captured in a meta.
pub fn seed64(rng: &mut SynthRng) -> u64 {
    rng.random()
}

/// Validated categorical distribution over `len` alternatives.
#[derive(Clone, Debug)]
pub struct Categorical {
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl Categorical {
    /// Build from explicit weights, or uniform weights over `len` alternatives.
    ///
    /// Weights are normalized; negative, non-finite, all-zero, or length-mismatched weights are a
    /// configuration error.
    pub fn new(len: usize, weights: Option<&[f64]>) -> SynthResult<Self> {
        if len == 0 {
            return Err(SynthError::config("categorical choice over an empty set"));
        }
        let weights = match weights {
            Some(w) if w.len() != len => {
                return Err(SynthError::config(format!(
                    "expected {len} weights, got {}",
                    w.len()
                )));
            }
            Some(w) => w.to_vec(),
            None => vec![1.0; len],
        };
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SynthError::config("weights must be finite and non-negative"));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SynthError::config("weights must not all be zero"));
        }
        let weights: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let index = WeightedIndex::new(&weights)
            .map_err(|e| SynthError::config(format!("invalid weights: {e}")))?;
        Ok(Self { weights, index })
    }

    /// Number of alternatives.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always `false`; construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Normalized weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Draw an index.
    pub fn sample(&self, rng: &mut SynthRng) -> usize {
        self.index.sample(rng)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/random.rs"]
mod tests;
