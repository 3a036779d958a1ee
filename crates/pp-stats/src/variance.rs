//! Sample and pooled variance.

use pp_core::traits::{PooledVariance, SampleVariance};
use pp_core::{Error, NumericVector, Result};

/// Arithmetic mean of a non-empty sample.
pub fn mean(sample: &NumericVector) -> Result<f64> {
    ensure_non_empty(sample)?;
    Ok(mean_of(sample.data()))
}

/// Mean of raw data; `NaN` for empty input.
pub(crate) fn mean_of(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

pub(crate) fn ensure_non_empty(sample: &NumericVector) -> Result<()> {
    if sample.is_empty() {
        return Err(Error::Validation("sample must be non-empty".to_string()));
    }
    Ok(())
}

/// Sample variance with Bessel's correction.
///
/// `sum((x - mean)^2) / (n - 1)`, and exactly `0` for a single observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BesselSampleVariance;

impl SampleVariance for BesselSampleVariance {
    fn calculate(&self, sample: &NumericVector) -> Result<f64> {
        ensure_non_empty(sample)?;
        let n = sample.len();
        if n == 1 {
            return Ok(0.0);
        }
        let m = mean_of(sample.data());
        let ss: f64 = sample.iter().map(|x| (x - m) * (x - m)).sum();
        Ok(ss / (n - 1) as f64)
    }
}

/// Unbiased least-squares estimate of the pooled variance.
///
/// Weighted average of per-sample variances with weights `n_i - 1`. When every
/// sample has a single observation all weights vanish and the result is `0` by
/// convention.
#[derive(Debug, Clone, Default)]
pub struct UnbiasedPooledVariance<S = BesselSampleVariance> {
    calculator: S,
}

impl UnbiasedPooledVariance {
    /// Pooled variance over Bessel-corrected sample variances.
    pub fn make() -> Self {
        Self::new(BesselSampleVariance)
    }
}

impl<S: SampleVariance> UnbiasedPooledVariance<S> {
    /// Pool the variances produced by `calculator`.
    pub fn new(calculator: S) -> Self {
        Self { calculator }
    }

    /// The per-sample variance calculator.
    pub fn calculator(&self) -> &S {
        &self.calculator
    }
}

impl<S: SampleVariance> PooledVariance for UnbiasedPooledVariance<S> {
    fn calculate(&self, samples: &[NumericVector]) -> Result<f64> {
        if samples.is_empty() {
            return Err(Error::Validation(
                "expecting at least one sample, received none".to_string(),
            ));
        }
        if samples.iter().all(|s| s.len() == 1) {
            return Ok(0.0);
        }

        let mut weighted = 0.0;
        let mut dof = 0.0;
        for sample in samples {
            let variance = self.calculator.calculate(sample)?;
            let weight = sample.len() as f64 - 1.0;
            weighted += weight * variance;
            dof += weight;
        }
        Ok(weighted / dof)
    }
}
