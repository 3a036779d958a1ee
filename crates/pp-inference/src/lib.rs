//! # pp-inference
//!
//! Permutation testing and Monte Carlo power simulation for permpower.
//!
//! - [`random`]: normal sample generation and shuffling over a borrowed stream
//! - [`permutation`]: the one-sided permutation p-value
//! - [`power`]: sequential and parallel power estimation, power curves and
//!   sample-size search
//!
//! ## Example
//!
//! ```no_run
//! use pp_inference::PowerSimulator;
//!
//! let mut simulator = PowerSimulator::make(1234)?;
//! let power = simulator.simulate(300, 300, 50, (0.5, 0.0), 1.0, 0.025)?;
//! println!("power = {power:.3}");
//! # Ok::<(), pp_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod permutation;
pub mod power;
pub mod random;

pub use permutation::{OneSidedPermutationPValue, PermutationOutcome, TwoSamplePermutator};
pub use power::{
    DefaultPValueCalculator, PowerSimulator, simulate_parallel, simulate_parallel_with,
};
pub use random::{RandNormalGenerator, ShufflePermutator, random_stream};
