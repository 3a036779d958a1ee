//! Monte Carlo power estimation for the one-sided permutation test.
//!
//! Each trial draws two normal samples of equal size, computes the permutation
//! p-value for the pair and records whether it fell strictly below `alpha`. The
//! power estimate is the share of rejecting trials.
//!
//! ## Random stream
//!
//! [`PowerSimulator`] exclusively owns one [`StdRng`] and lends it, in a fixed
//! order, to the generator (first group, then second group) and to the p-value
//! calculator. Identical seeds and identical call sequences therefore produce
//! bit-identical estimates. Every argument is validated before the first draw, so
//! a rejected call leaves the stream untouched.
//!
//! [`simulate_parallel`] trades that single stream for one independent stream per
//! trial (`seed + trial_index`), which keeps results reproducible and independent
//! of the thread count, but not equal to the sequential estimate.

use pp_core::traits::{NormalGenerator, PValueCalculator};
use pp_core::{
    Error, PowerConfig, PowerCurvePoint, PowerEstimate, Result, SampleSizeResult, SamplePair,
};
use pp_stats::PooledTTestStatistic;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::permutation::OneSidedPermutationPValue;
use crate::random::{RandNormalGenerator, ShufflePermutator};

/// p-value calculator wired by [`PowerSimulator::make`].
pub type DefaultPValueCalculator = OneSidedPermutationPValue<PooledTTestStatistic, ShufflePermutator>;

fn default_p_value_calculator() -> DefaultPValueCalculator {
    OneSidedPermutationPValue::make(PooledTTestStatistic::make(), ShufflePermutator)
}

/// Run one trial: `true` when the null hypothesis is rejected.
fn run_trial<G, V>(
    rng: &mut dyn RngCore,
    generator: &G,
    calculator: &V,
    config: &PowerConfig,
) -> Result<bool>
where
    G: NormalGenerator + ?Sized,
    V: PValueCalculator + ?Sized,
{
    let n = config.number_of_observations;
    let first = generator.generate(rng, n, config.means[0], config.scale)?;
    let second = generator.generate(rng, n, config.means[1], config.scale)?;
    let samples = SamplePair::new(first, second);
    let p_value = calculator.calculate(rng, config.number_of_permutations, &samples)?;
    Ok(p_value < config.alpha)
}

/// Sequential power simulator over a single owned random stream.
#[derive(Debug, Clone)]
pub struct PowerSimulator<G = RandNormalGenerator, V = DefaultPValueCalculator> {
    rng: StdRng,
    generator: G,
    calculator: V,
}

impl PowerSimulator {
    /// Simulator with the default components, seeded with `seed`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `seed` is negative.
    pub fn make(seed: i64) -> Result<Self> {
        let seed = u64::try_from(seed)
            .map_err(|_| Error::Validation(format!("seed must be non-negative, was [{seed}]")))?;
        Ok(Self::new(StdRng::seed_from_u64(seed), RandNormalGenerator, default_p_value_calculator()))
    }
}

impl<G: NormalGenerator, V: PValueCalculator> PowerSimulator<G, V> {
    /// Assemble a simulator from explicit components.
    pub fn new(rng: StdRng, generator: G, calculator: V) -> Self {
        Self { rng, generator, calculator }
    }

    /// The sample generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The p-value calculator.
    pub fn calculator(&self) -> &V {
        &self.calculator
    }

    /// Estimate power; returns the share of trials with `p < alpha`.
    ///
    /// # Errors
    /// - [`Error::Validation`] for invalid arguments (before any draw);
    /// - any error raised by a trial, which aborts the whole call.
    pub fn simulate(
        &mut self,
        number_of_simulations: usize,
        number_of_permutations: usize,
        number_of_observations: usize,
        means: (f64, f64),
        scale: f64,
        alpha: f64,
    ) -> Result<f64> {
        let config = PowerConfig {
            number_of_simulations,
            number_of_permutations,
            number_of_observations,
            means: [means.0, means.1],
            scale,
            alpha,
        };
        Ok(self.simulate_with(&config)?.power)
    }

    /// Estimate power with rejection count and Monte Carlo standard error.
    pub fn simulate_with(&mut self, config: &PowerConfig) -> Result<PowerEstimate> {
        config.validate()?;
        self.run(config)
    }

    fn run(&mut self, config: &PowerConfig) -> Result<PowerEstimate> {
        let mut rejections = 0usize;
        for _ in 0..config.number_of_simulations {
            if run_trial(&mut self.rng, &self.generator, &self.calculator, config)? {
                rejections += 1;
            }
        }
        let estimate = PowerEstimate::from_rejections(rejections, config.number_of_simulations);
        log::debug!(
            "power simulation: {} of {} trials rejected (power = {:.4}, se = {:.4})",
            estimate.rejections,
            estimate.number_of_simulations,
            estimate.power,
            estimate.standard_error
        );
        Ok(estimate)
    }

    /// Power as a function of the mean difference.
    ///
    /// For each `d` in `differences` the first group's mean is set to
    /// `config.means[1] + d`. Points are simulated in order on the shared stream.
    pub fn power_curve(
        &mut self,
        config: &PowerConfig,
        differences: &[f64],
    ) -> Result<Vec<PowerCurvePoint>> {
        config.validate()?;
        if differences.is_empty() {
            return Err(Error::Validation(
                "expecting at least one mean difference, received none".to_string(),
            ));
        }
        let configs = differences
            .iter()
            .map(|&d| {
                if !d.is_finite() {
                    return Err(Error::Validation(format!(
                        "mean difference must be finite, was [{d}]"
                    )));
                }
                let shifted = config.with_difference(d);
                shifted.validate()?;
                Ok((d, shifted))
            })
            .collect::<Result<Vec<_>>>()?;

        configs
            .iter()
            .map(|(difference, shifted)| {
                Ok(PowerCurvePoint { difference: *difference, estimate: self.run(shifted)? })
            })
            .collect()
    }

    /// Smallest group size among `candidates` whose power reaches `target_power`.
    ///
    /// Candidates are evaluated in ascending order and the search stops at the first
    /// size that qualifies. When none does, `number_of_observations` is `None` and
    /// `achieved_power` is the best power seen.
    pub fn find_sample_size(
        &mut self,
        config: &PowerConfig,
        candidates: &[usize],
        target_power: f64,
    ) -> Result<SampleSizeResult> {
        config.validate()?;
        if !(0.0..=1.0).contains(&target_power) {
            return Err(Error::Validation(format!(
                "target power must be in [0, 1], was [{target_power}]"
            )));
        }
        if candidates.is_empty() {
            return Err(Error::Validation(
                "expecting at least one candidate sample size, received none".to_string(),
            ));
        }
        let mut sizes = candidates.to_vec();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes[0] < 2 {
            return Err(Error::Validation(format!(
                "number of observations must be at least 2, was [{}]",
                sizes[0]
            )));
        }

        let mut curve = Vec::with_capacity(sizes.len());
        for n in sizes {
            let sized = PowerConfig { number_of_observations: n, ..*config };
            let power = self.run(&sized)?.power;
            curve.push((n, power));
            if power >= target_power {
                return Ok(SampleSizeResult {
                    number_of_observations: Some(n),
                    achieved_power: power,
                    curve,
                });
            }
        }

        let best = curve.iter().map(|&(_, p)| p).fold(0.0, f64::max);
        log::warn!("sample size search: no candidate reached power {target_power} (best {best:.4})");
        Ok(SampleSizeResult { number_of_observations: None, achieved_power: best, curve })
    }
}

/// Parallel power estimate with default components and per-trial streams.
///
/// Trial `i` draws from `StdRng::seed_from_u64(seed + i)` (wrapping). `n_threads = 0`
/// uses Rayon's global pool.
pub fn simulate_parallel(seed: u64, config: &PowerConfig, n_threads: usize) -> Result<PowerEstimate> {
    simulate_parallel_with(
        &RandNormalGenerator,
        &default_p_value_calculator(),
        seed,
        config,
        n_threads,
    )
}

/// [`simulate_parallel`] with explicit components.
pub fn simulate_parallel_with<G, V>(
    generator: &G,
    calculator: &V,
    seed: u64,
    config: &PowerConfig,
    n_threads: usize,
) -> Result<PowerEstimate>
where
    G: NormalGenerator,
    V: PValueCalculator,
{
    config.validate()?;

    let run_trials = || -> Result<usize> {
        let outcomes = (0..config.number_of_simulations)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                run_trial(&mut rng, generator, calculator, config)
            })
            .collect::<Result<Vec<bool>>>()?;
        Ok(outcomes.into_iter().filter(|&rejected| rejected).count())
    };

    let rejections = if n_threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| Error::Computation(format!("failed to create thread pool: {e}")))?;
        pool.install(run_trials)?
    } else {
        run_trials()?
    };

    let estimate = PowerEstimate::from_rejections(rejections, config.number_of_simulations);
    log::debug!(
        "parallel power simulation: {} of {} trials rejected (power = {:.4})",
        estimate.rejections,
        estimate.number_of_simulations,
        estimate.power
    );
    Ok(estimate)
}
