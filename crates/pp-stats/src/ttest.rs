//! Two-sample t-statistic under the equal-variance assumption.
//!
//! `t = (mean_1 - mean_2) / sqrt(s_p^2 * (1/n_1 + 1/n_2))`
//!
//! Two policies compute the same quantity:
//! - [`PooledTTestStatistic`] composes an injected [`PooledVariance`] calculator;
//! - [`FusedTTestStatistic`] makes one pass per sample and skips the calculator
//!   layer, which matters inside the permutation loop.
//!
//! Both fail with [`Error::Validation`] for an empty sample and with
//! [`Error::UndefinedStatistic`] when the pooled variance is exactly zero.

use pp_core::traits::{PooledVariance, TwoSampleStatistic};
use pp_core::{Error, NumericVector, Result, SamplePair};

use crate::variance::{UnbiasedPooledVariance, ensure_non_empty, mean_of};

fn zero_variance_error() -> Error {
    Error::UndefinedStatistic(
        "cannot compute t-test statistic, unbiased pooled variance of provided samples is 0"
            .to_string(),
    )
}

#[inline]
fn t_statistic(mean_1: f64, n_1: usize, mean_2: f64, n_2: usize, variance: f64) -> f64 {
    (mean_1 - mean_2) / (variance * (1.0 / n_1 as f64 + 1.0 / n_2 as f64)).sqrt()
}

/// Independent two-sample t-statistic built on a pooled-variance calculator.
#[derive(Debug, Clone, Default)]
pub struct PooledTTestStatistic<P = UnbiasedPooledVariance> {
    calculator: P,
}

impl PooledTTestStatistic {
    /// Statistic over the unbiased pooled variance.
    pub fn make() -> Self {
        Self::new(UnbiasedPooledVariance::make())
    }
}

impl<P: PooledVariance> PooledTTestStatistic<P> {
    /// Use `calculator` for the pooled variance.
    pub fn new(calculator: P) -> Self {
        Self { calculator }
    }

    /// The pooled-variance calculator.
    pub fn calculator(&self) -> &P {
        &self.calculator
    }
}

impl<P: PooledVariance> TwoSampleStatistic for PooledTTestStatistic<P> {
    fn calculate(&self, samples: &SamplePair) -> Result<f64> {
        let variance = self.calculator.calculate(samples.as_slice())?;
        if variance == 0.0 {
            return Err(zero_variance_error());
        }
        let (a, b) = (samples.first(), samples.second());
        Ok(t_statistic(mean_of(a.data()), a.len(), mean_of(b.data()), b.len(), variance))
    }
}

/// Single-pass equivalent of `PooledTTestStatistic::make()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusedTTestStatistic;

/// Mean and sum of squared deviations.
fn moments(sample: &NumericVector) -> Result<(f64, f64)> {
    ensure_non_empty(sample)?;
    let m = mean_of(sample.data());
    let ss = sample.iter().map(|x| (x - m) * (x - m)).sum();
    Ok((m, ss))
}

impl TwoSampleStatistic for FusedTTestStatistic {
    fn calculate(&self, samples: &SamplePair) -> Result<f64> {
        let (a, b) = (samples.first(), samples.second());
        let (mean_a, ss_a) = moments(a)?;
        let (mean_b, ss_b) = moments(b)?;

        let dof = a.len() + b.len() - 2;
        let variance = if dof == 0 { 0.0 } else { (ss_a + ss_b) / dof as f64 };
        if variance == 0.0 {
            return Err(zero_variance_error());
        }
        Ok(t_statistic(mean_a, a.len(), mean_b, b.len(), variance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn pair(a: &[f64], b: &[f64]) -> SamplePair {
        SamplePair::new(NumericVector::from_slice(a).unwrap(), NumericVector::from_slice(b).unwrap())
    }

    struct FixedVariance(f64);

    impl PooledVariance for FixedVariance {
        fn calculate(&self, _samples: &[NumericVector]) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn policies() -> Vec<(&'static str, Box<dyn TwoSampleStatistic>)> {
        vec![
            ("pooled", Box::new(PooledTTestStatistic::make())),
            ("fused", Box::new(FusedTTestStatistic)),
        ]
    }

    #[test]
    fn test_stub_zero_variance_is_undefined() {
        let stat = PooledTTestStatistic::new(FixedVariance(0.0));
        let err = stat.calculate(&pair(&[1.0, 2.0], &[1.0])).unwrap_err();
        assert!(matches!(err, Error::UndefinedStatistic(_)));
        assert!(err.to_string().contains("pooled variance of provided samples is 0"));
    }

    #[test]
    fn test_stub_non_zero_variance() {
        let stat = PooledTTestStatistic::new(FixedVariance(6.4));
        let result = stat
            .calculate(&pair(&[5.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[2.0, 2.0]))
            .unwrap();
        assert_eq!(result, 1.5);
    }

    #[test]
    fn test_empty_samples_are_validation_errors() {
        for (name, stat) in policies() {
            for (a, b) in [(&[][..], &[][..]), (&[1.0, 2.0, 3.0][..], &[][..]), (&[][..], &[1.0, 2.0][..])] {
                let err = stat.calculate(&pair(a, b)).unwrap_err();
                assert!(matches!(err, Error::Validation(_)), "{name}: {err}");
                assert!(err.to_string().contains("must be non-empty"), "{name}: {err}");
            }
        }
    }

    #[test]
    fn test_size_one_samples_are_undefined() {
        for (name, stat) in policies() {
            let err = stat.calculate(&pair(&[1.0], &[2.0])).unwrap_err();
            assert!(matches!(err, Error::UndefinedStatistic(_)), "{name}: {err}");
        }
    }

    #[test]
    fn test_constant_samples_are_undefined() {
        for (name, stat) in policies() {
            let err = stat.calculate(&pair(&[3.0, 3.0], &[3.0, 3.0, 3.0])).unwrap_err();
            assert!(matches!(err, Error::UndefinedStatistic(_)), "{name}: {err}");
        }
    }

    #[test]
    fn test_same_sample_size() {
        for (_, stat) in policies() {
            let t = stat.calculate(&pair(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0])).unwrap();
            assert_relative_eq!(t, -3.6742346141747673, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_different_sample_size() {
        for (_, stat) in policies() {
            let t = stat.calculate(&pair(&[1.0, 2.0, 3.0], &[4.0, 5.0])).unwrap();
            assert_relative_eq!(t, -3.0, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_sign_follows_order() {
        let stat = FusedTTestStatistic;
        let forward = stat.calculate(&pair(&[4.0, 5.0, 6.0], &[1.0, 2.0, 3.0])).unwrap();
        assert!(forward > 0.0);
    }

    proptest! {
        #[test]
        fn prop_policies_agree(
            a in proptest::collection::vec(-100.0f64..100.0, 2..40),
            b in proptest::collection::vec(-100.0f64..100.0, 2..40),
        ) {
            let samples = pair(&a, &b);
            let pooled = PooledTTestStatistic::make().calculate(&samples);
            let fused = FusedTTestStatistic.calculate(&samples);
            match (pooled, fused) {
                (Ok(x), Ok(y)) => prop_assert!((x - y).abs() <= 1e-9 * x.abs().max(1.0)),
                (Err(_), Err(_)) => {}
                (x, y) => prop_assert!(false, "policies disagree: {:?} vs {:?}", x, y),
            }
        }
    }
}
