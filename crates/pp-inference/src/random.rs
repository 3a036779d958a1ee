//! Randomised components: normal sample generation and permutation.
//!
//! Neither component owns a random stream. Each call borrows the caller's stream,
//! so a simulator can thread a single [`StdRng`] through generation and shuffling
//! in a fixed order and stay reproducible for a given seed.

use pp_core::traits::{NormalGenerator, Permutator};
use pp_core::{Error, NumericVector, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Deterministic random stream for `seed`.
pub fn random_stream(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Normal sample generator backed by `rand_distr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandNormalGenerator;

impl RandNormalGenerator {
    fn validate(size: usize, mean: f64, scale: f64) -> Result<()> {
        if size == 0 {
            return Err(Error::Validation(format!("size must be strictly positive, was [{size}]")));
        }
        if !mean.is_finite() {
            return Err(Error::Validation(format!("mean must be finite, was [{mean}]")));
        }
        if scale < 0.0 {
            return Err(Error::Validation(format!("scale must be non-negative, was [{scale}]")));
        }
        if !scale.is_finite() {
            return Err(Error::Validation(format!("scale must be finite, was [{scale}]")));
        }
        Ok(())
    }
}

impl NormalGenerator for RandNormalGenerator {
    fn generate(
        &self,
        rng: &mut dyn RngCore,
        size: usize,
        mean: f64,
        scale: f64,
    ) -> Result<NumericVector> {
        Self::validate(size, mean, scale)?;
        let normal = Normal::new(mean, scale)
            .map_err(|e| Error::Validation(format!("invalid normal parameters: {e}")))?;
        let draws: Vec<f64> = (0..size).map(|_| normal.sample(&mut *rng)).collect();
        NumericVector::new(draws)
    }
}

/// Fisher-Yates shuffle permutator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShufflePermutator;

impl Permutator for ShufflePermutator {
    fn permute(&self, rng: &mut dyn RngCore, vector: &NumericVector) -> NumericVector {
        if vector.len() < 2 {
            return vector.clone();
        }
        let mut data = vector.to_vec();
        data.shuffle(rng);
        // A reordering of finite values is finite.
        NumericVector::new(data).unwrap_or_else(|_| vector.clone())
    }
}
