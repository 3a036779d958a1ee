//! Capability traits for permpower
//!
//! Each stage of the power pipeline is an injectable capability: the orchestrating
//! components (`pp-inference`) depend only on these traits, never on the concrete
//! estimators in `pp-stats`, so tests can substitute deterministic stubs.
//!
//! Components that consume randomness receive the stream as `&mut dyn RngCore` on
//! every call. They never own or clone it; the simulator does.

use rand::RngCore;

use crate::{NumericVector, Result, SamplePair};

/// Variance of a single sample.
pub trait SampleVariance: Send + Sync {
    /// Fails with a validation error when `sample` is empty.
    fn calculate(&self, sample: &NumericVector) -> Result<f64>;
}

/// Variance pooled over any non-empty collection of samples.
pub trait PooledVariance: Send + Sync {
    /// Fails with a validation error when `samples` is empty or contains an empty sample.
    fn calculate(&self, samples: &[NumericVector]) -> Result<f64>;
}

/// Test statistic computed from an ordered pair of samples.
pub trait TwoSampleStatistic: Send + Sync {
    /// Compute the statistic for `samples`.
    fn calculate(&self, samples: &SamplePair) -> Result<f64>;
}

/// Source of normally distributed samples.
pub trait NormalGenerator: Send + Sync {
    /// Draw `size` variates from `N(mean, scale)`.
    ///
    /// Implementations must validate every argument before touching `rng`.
    fn generate(
        &self,
        rng: &mut dyn RngCore,
        size: usize,
        mean: f64,
        scale: f64,
    ) -> Result<NumericVector>;
}

/// Uniform random reordering of a vector.
pub trait Permutator: Send + Sync {
    /// Return a permutation of `vector`. Never fails, including for empty input.
    fn permute(&self, rng: &mut dyn RngCore, vector: &NumericVector) -> NumericVector;
}

/// One-sided p-value for a sample pair.
pub trait PValueCalculator: Send + Sync {
    /// Compute the p-value using `number_of_permutations` resamples.
    fn calculate(
        &self,
        rng: &mut dyn RngCore,
        number_of_permutations: usize,
        samples: &SamplePair,
    ) -> Result<f64>;
}
