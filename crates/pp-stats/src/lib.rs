//! Estimators for permpower.
//!
//! This crate hosts the deterministic numerical building blocks of the
//! permutation test:
//! - sample and pooled variance (Bessel-corrected, degrees-of-freedom weighted)
//! - the equal-variance two-sample t-statistic, in two interchangeable policies
//!
//! Every estimator implements a capability trait from `pp_core::traits`.

pub mod ttest;
pub mod variance;

pub use ttest::{FusedTTestStatistic, PooledTTestStatistic};
pub use variance::{BesselSampleVariance, UnbiasedPooledVariance, mean};
