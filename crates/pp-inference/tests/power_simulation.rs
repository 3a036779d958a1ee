//! End-to-end power simulation tests.
//!
//! Tolerances on Monte Carlo estimates are expressed in binomial standard errors
//! of the estimate, so they hold for any seed rather than one particular stream.

use approx::assert_abs_diff_eq;
use pp_core::traits::{NormalGenerator, TwoSampleStatistic};
use pp_core::{Error, PowerConfig, SamplePair};
use pp_inference::{
    OneSidedPermutationPValue, PowerSimulator, RandNormalGenerator, ShufflePermutator,
    random_stream, simulate_parallel,
};
use pp_stats::{FusedTTestStatistic, PooledTTestStatistic};
use statrs::distribution::{ContinuousCDF, StudentsT};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binomial_se(p: f64, n: usize) -> f64 {
    (p * (1.0 - p) / n as f64).sqrt()
}

fn quick_config(difference: f64) -> PowerConfig {
    PowerConfig {
        number_of_simulations: 60,
        number_of_permutations: 60,
        number_of_observations: 12,
        ..PowerConfig::default()
    }
    .with_difference(difference)
}

// ---------------------------------------------------------------------------
// Reference scenario
// ---------------------------------------------------------------------------

#[test]
fn reference_scenario_matches_t_test_power() {
    // One-sided t-test power for d = 0.5, n = 50 per group, alpha = 0.025.
    let expected = 0.697;
    let mut simulator = PowerSimulator::make(1234).unwrap();
    let power = simulator.simulate(300, 300, 50, (0.5, 0.0), 1.0, 0.025).unwrap();

    let tolerance = 4.0 * binomial_se(expected, 300);
    assert!(
        (power - expected).abs() < tolerance,
        "power {power} outside {expected} +/- {tolerance}"
    );
}

#[test]
fn same_seed_is_bit_identical() {
    let config = quick_config(0.8);
    let a = PowerSimulator::make(42).unwrap().simulate_with(&config).unwrap();
    let b = PowerSimulator::make(42).unwrap().simulate_with(&config).unwrap();
    assert_eq!(a.power.to_bits(), b.power.to_bits());
    assert_eq!(a, b);
}

#[test]
fn rejected_call_leaves_stream_untouched() {
    let config = quick_config(0.5);

    let mut used = PowerSimulator::make(99).unwrap();
    let err = used.simulate(10, 10, 1, (0.0, 0.0), 1.0, 0.05).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = used.simulate(10, 0, 10, (0.0, 0.0), 1.0, 0.05).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let after = used.simulate_with(&config).unwrap();

    let fresh = PowerSimulator::make(99).unwrap().simulate_with(&config).unwrap();
    assert_eq!(after, fresh);
}

#[test]
fn power_increases_with_effect_size() {
    let config = PowerConfig {
        number_of_simulations: 200,
        number_of_permutations: 100,
        number_of_observations: 20,
        ..PowerConfig::default()
    };
    let mut simulator = PowerSimulator::make(7).unwrap();
    let curve = simulator.power_curve(&config, &[0.0, 0.5, 1.0]).unwrap();
    let powers: Vec<f64> = curve.iter().map(|p| p.estimate.power).collect();
    assert!(powers[0] < powers[1] && powers[1] < powers[2], "{powers:?}");
    assert!(powers[2] > 0.6, "{powers:?}");
}

#[test]
fn null_rejection_rate_is_close_to_alpha() {
    let config = PowerConfig {
        number_of_simulations: 400,
        number_of_permutations: 100,
        number_of_observations: 15,
        means: [0.0, 0.0],
        scale: 2.0,
        alpha: 0.05,
    };
    let estimate = PowerSimulator::make(2024).unwrap().simulate_with(&config).unwrap();
    let tolerance = 4.0 * binomial_se(config.alpha, config.number_of_simulations);
    assert!(
        (estimate.power - config.alpha).abs() < tolerance,
        "null rejection rate {} outside {} +/- {tolerance}",
        estimate.power,
        config.alpha
    );
}

#[test]
fn fused_statistic_gives_the_same_estimate() {
    let config = quick_config(0.7);
    let pooled = PowerSimulator::make(5).unwrap().simulate_with(&config).unwrap();

    let mut fused = PowerSimulator::new(
        random_stream(5),
        RandNormalGenerator,
        OneSidedPermutationPValue::make(FusedTTestStatistic, ShufflePermutator),
    );
    let fused = fused.simulate_with(&config).unwrap();
    assert_abs_diff_eq!(pooled.power, fused.power, epsilon = 0.05);
}

// ---------------------------------------------------------------------------
// Permutation p-value against the analytic t distribution
// ---------------------------------------------------------------------------

#[test]
fn permutation_p_value_approximates_students_t() {
    let mut rng = random_stream(314);
    let n = 30;
    let first = RandNormalGenerator.generate(&mut rng, n, 0.4, 1.0).unwrap();
    let second = RandNormalGenerator.generate(&mut rng, n, 0.0, 1.0).unwrap();
    let samples = SamplePair::new(first, second);

    let t = PooledTTestStatistic::make().calculate(&samples).unwrap();
    let students = StudentsT::new(0.0, 1.0, (2 * n - 2) as f64).unwrap();
    let analytic = 1.0 - students.cdf(t);

    let calculator = OneSidedPermutationPValue::make(PooledTTestStatistic::make(), ShufflePermutator);
    let outcome = calculator.outcome(&mut rng, 20_000, &samples).unwrap();
    assert_eq!(outcome.observed, t);
    assert_eq!(outcome.missing, 0);
    assert_abs_diff_eq!(outcome.p_value(), analytic, epsilon = 0.03);
}

// ---------------------------------------------------------------------------
// Parallel simulation
// ---------------------------------------------------------------------------

#[test]
fn parallel_estimate_does_not_depend_on_thread_count() {
    let config = quick_config(0.6);
    let single = simulate_parallel(17, &config, 1).unwrap();
    let several = simulate_parallel(17, &config, 4).unwrap();
    let global = simulate_parallel(17, &config, 0).unwrap();
    assert_eq!(single, several);
    assert_eq!(single, global);
}

#[test]
fn parallel_reference_scenario_is_plausible() {
    let config = PowerConfig::default();
    let expected = 0.697;
    let estimate = simulate_parallel(1234, &config, 0).unwrap();
    let tolerance = 4.0 * binomial_se(expected, config.number_of_simulations);
    assert!((estimate.power - expected).abs() < tolerance, "{estimate:?}");
}

// ---------------------------------------------------------------------------
// Sample-size search
// ---------------------------------------------------------------------------

#[test]
fn sample_size_search_finds_a_qualifying_size() {
    let config = PowerConfig {
        number_of_simulations: 100,
        number_of_permutations: 100,
        ..PowerConfig::default()
    };
    let mut simulator = PowerSimulator::make(11).unwrap();
    let result = simulator.find_sample_size(&config, &[120, 10, 30, 60], 0.8).unwrap();

    // n = 10 and n = 30 have true power near 0.11 and 0.47.
    let chosen = result.number_of_observations.expect("n = 120 has power near 0.97");
    assert!(chosen == 60 || chosen == 120, "{result:?}");
    assert!(result.achieved_power >= 0.8);

    let (last, rest) = result.curve.split_last().unwrap();
    assert_eq!(last.0, chosen);
    assert!(rest.iter().all(|&(_, p)| p < 0.8));
    let sizes: Vec<usize> = result.curve.iter().map(|&(n, _)| n).collect();
    assert!(sizes.windows(2).all(|w| w[0] < w[1]));
}
