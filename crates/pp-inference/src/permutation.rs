//! One-sided two-sample permutation test.
//!
//! The observed statistic is computed on the original pair. The pooled
//! observations are then shuffled `number_of_permutations` times and split back
//! into groups of the original sizes. Permutations whose statistic is undefined
//! (a zero-variance split) are recorded as missing and excluded from the null
//! distribution; if all of them are missing the calculation fails.
//!
//! The p-value is the fraction of defined permuted statistics **strictly greater**
//! than the observed one. Ties do not count.

use pp_core::traits::{PValueCalculator, Permutator, TwoSampleStatistic};
use pp_core::{Error, NumericVector, Result, SamplePair};
use rand::RngCore;

/// Observed statistic together with its permutation distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationOutcome {
    /// Statistic of the original sample pair.
    pub observed: f64,
    /// Defined permuted statistics, in draw order.
    pub permuted: NumericVector,
    /// Number of permutations drawn.
    pub requested: usize,
    /// Number of permutations whose statistic was undefined.
    pub missing: usize,
}

impl PermutationOutcome {
    /// One-sided p-value: share of permuted statistics strictly above the observed one.
    pub fn p_value(&self) -> f64 {
        let exceed = self.permuted.iter().filter(|&t| t > self.observed).count();
        exceed as f64 / self.permuted.len() as f64
    }
}

/// Draws the permutation distribution of a two-sample statistic.
#[derive(Debug, Clone, Default)]
pub struct TwoSamplePermutator<T, P> {
    statistic: T,
    permutator: P,
}

impl<T: TwoSampleStatistic, P: Permutator> TwoSamplePermutator<T, P> {
    /// Combine a statistic with a permutator.
    pub fn new(statistic: T, permutator: P) -> Self {
        Self { statistic, permutator }
    }

    /// The statistic evaluated on every permutation.
    pub fn statistic(&self) -> &T {
        &self.statistic
    }

    /// The permutator used to shuffle pooled observations.
    pub fn permutator(&self) -> &P {
        &self.permutator
    }

    /// Compute the observed statistic and `number_of_permutations` permuted ones.
    ///
    /// # Errors
    /// - [`Error::Validation`] if `number_of_permutations` is zero, or a sample is empty;
    /// - [`Error::UndefinedStatistic`] if the observed statistic is undefined;
    /// - [`Error::ExhaustedResampling`] if every permuted statistic is undefined.
    pub fn permute(
        &self,
        rng: &mut dyn RngCore,
        number_of_permutations: usize,
        samples: &SamplePair,
    ) -> Result<PermutationOutcome> {
        if number_of_permutations == 0 {
            return Err(Error::Validation(format!(
                "number of permutations must be strictly positive, was [{number_of_permutations}]"
            )));
        }

        let observed = self.statistic.calculate(samples)?;
        let pooled = NumericVector::concatenate(samples.as_slice());
        let split_at = samples.first().len() as isize;

        let mut permuted = Vec::with_capacity(number_of_permutations);
        for _ in 0..number_of_permutations {
            if let Some(t) = self.try_permuted_statistic(rng, &pooled, split_at)? {
                permuted.push(t);
            }
        }

        let missing = number_of_permutations - permuted.len();
        if permuted.is_empty() {
            return Err(Error::ExhaustedResampling(format!(
                "unable to generate permutations with a defined t-test statistic, \
                 all [{number_of_permutations}] were undefined"
            )));
        }
        if missing > number_of_permutations / 2 {
            log::warn!(
                "permutation test: {missing} of {number_of_permutations} permuted statistics undefined"
            );
        } else if missing > 0 {
            log::debug!(
                "permutation test: {missing} of {number_of_permutations} permuted statistics undefined"
            );
        }

        Ok(PermutationOutcome {
            observed,
            permuted: NumericVector::new(permuted)?,
            requested: number_of_permutations,
            missing,
        })
    }

    /// `None` when the permuted statistic is undefined.
    fn try_permuted_statistic(
        &self,
        rng: &mut dyn RngCore,
        pooled: &NumericVector,
        split_at: isize,
    ) -> Result<Option<f64>> {
        let shuffled = self.permutator.permute(rng, pooled);
        let (first, second) = shuffled.split(split_at);
        match self.statistic.calculate(&SamplePair::new(first, second)) {
            Ok(t) if t.is_finite() => Ok(Some(t)),
            Ok(_) => Ok(None),
            Err(e) if e.is_undefined_permutation() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// p-value calculator for the one-sided alternative "first mean > second mean".
#[derive(Debug, Clone, Default)]
pub struct OneSidedPermutationPValue<T, P> {
    permutator: TwoSamplePermutator<T, P>,
}

impl<T: TwoSampleStatistic, P: Permutator> OneSidedPermutationPValue<T, P> {
    /// Build from a statistic and a permutator.
    pub fn make(statistic: T, permutator: P) -> Self {
        Self::new(TwoSamplePermutator::new(statistic, permutator))
    }

    /// Wrap an existing two-sample permutator.
    pub fn new(permutator: TwoSamplePermutator<T, P>) -> Self {
        Self { permutator }
    }

    /// The underlying two-sample permutator.
    pub fn permutator(&self) -> &TwoSamplePermutator<T, P> {
        &self.permutator
    }

    /// Full outcome instead of just the p-value.
    pub fn outcome(
        &self,
        rng: &mut dyn RngCore,
        number_of_permutations: usize,
        samples: &SamplePair,
    ) -> Result<PermutationOutcome> {
        self.permutator.permute(rng, number_of_permutations, samples)
    }
}

impl<T: TwoSampleStatistic, P: Permutator> PValueCalculator for OneSidedPermutationPValue<T, P> {
    fn calculate(
        &self,
        rng: &mut dyn RngCore,
        number_of_permutations: usize,
        samples: &SamplePair,
    ) -> Result<f64> {
        Ok(self.outcome(rng, number_of_permutations, samples)?.p_value())
    }
}
