//! # pp-core
//!
//! Core types and abstractions for permpower.
//!
//! This crate provides:
//! - [`Error`] / [`Result`]: the error taxonomy shared by every crate
//! - [`NumericVector`] / [`SamplePair`]: immutable finite-valued sample data
//! - capability traits ([`traits`]) that the estimators implement
//! - serializable configuration and result types ([`types`])
//!
//! ## Architecture
//!
//! Higher-level crates depend on the traits defined here, not on concrete
//! implementations, so every stage of the pipeline can be swapped in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

pub use error::{Error, Result};
pub use traits::{
    NormalGenerator, PValueCalculator, Permutator, PooledVariance, SampleVariance,
    TwoSampleStatistic,
};
pub use types::{PowerConfig, PowerCurvePoint, PowerEstimate, SampleSizeResult};
pub use vector::{NumericVector, SamplePair};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
