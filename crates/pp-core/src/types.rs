//! Common data types for permpower

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parameters of one power simulation.
///
/// Deserializes from JSON with every field optional; missing fields take the
/// defaults of [`PowerConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerConfig {
    /// Independent trials to simulate (> 0).
    #[serde(default = "default_number_of_simulations")]
    pub number_of_simulations: usize,
    /// Permutations per p-value (> 0).
    #[serde(default = "default_number_of_permutations")]
    pub number_of_permutations: usize,
    /// Observations drawn for each group (>= 2).
    #[serde(default = "default_number_of_observations")]
    pub number_of_observations: usize,
    /// Population means of the first and second group.
    #[serde(default = "default_means")]
    pub means: [f64; 2],
    /// Common population standard deviation (finite, >= 0).
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Significance level in `[0, 1]`.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_number_of_simulations() -> usize {
    300
}

fn default_number_of_permutations() -> usize {
    300
}

fn default_number_of_observations() -> usize {
    50
}

fn default_means() -> [f64; 2] {
    [0.5, 0.0]
}

fn default_scale() -> f64 {
    1.0
}

fn default_alpha() -> f64 {
    0.025
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            number_of_simulations: default_number_of_simulations(),
            number_of_permutations: default_number_of_permutations(),
            number_of_observations: default_number_of_observations(),
            means: default_means(),
            scale: default_scale(),
            alpha: default_alpha(),
        }
    }
}

impl PowerConfig {
    /// Check every simulation precondition.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming the first violated precondition.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_simulations == 0 {
            return Err(Error::Validation(format!(
                "number of simulations must be strictly positive, was [{}]",
                self.number_of_simulations
            )));
        }
        if self.number_of_permutations == 0 {
            return Err(Error::Validation(format!(
                "number of permutations must be strictly positive, was [{}]",
                self.number_of_permutations
            )));
        }
        if self.number_of_observations < 2 {
            return Err(Error::Validation(format!(
                "number of observations must be at least 2, was [{}]",
                self.number_of_observations
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::Validation(format!("alpha must be in [0, 1], was [{}]", self.alpha)));
        }
        for (i, mean) in self.means.iter().enumerate() {
            if !mean.is_finite() {
                return Err(Error::Validation(format!(
                    "mean of group {} must be finite, was [{mean}]",
                    i + 1
                )));
            }
        }
        if !self.scale.is_finite() {
            return Err(Error::Validation(format!("scale must be finite, was [{}]", self.scale)));
        }
        if self.scale < 0.0 {
            return Err(Error::Validation(format!(
                "scale must be non-negative, was [{}]",
                self.scale
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Copy of this config with the first group's mean shifted `difference` above the second.
    pub fn with_difference(&self, difference: f64) -> Self {
        Self { means: [self.means[1] + difference, self.means[1]], ..*self }
    }
}

/// Result of a power simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerEstimate {
    /// Fraction of trials whose p-value fell below alpha.
    pub power: f64,
    /// Number of trials whose p-value fell below alpha.
    pub rejections: usize,
    /// Number of trials simulated.
    pub number_of_simulations: usize,
    /// Binomial Monte Carlo standard error of `power`.
    pub standard_error: f64,
}

impl PowerEstimate {
    /// Build an estimate from a rejection count.
    pub fn from_rejections(rejections: usize, number_of_simulations: usize) -> Self {
        if number_of_simulations == 0 {
            return Self { power: 0.0, rejections: 0, number_of_simulations, standard_error: 0.0 };
        }
        let n = number_of_simulations as f64;
        let power = rejections as f64 / n;
        let standard_error = (power * (1.0 - power) / n).sqrt();
        Self { power, rejections, number_of_simulations, standard_error }
    }
}

/// One point on a power curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCurvePoint {
    /// First-group mean minus second-group mean.
    pub difference: f64,
    /// Power estimated at that difference.
    pub estimate: PowerEstimate,
}

/// Outcome of a sample-size search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeResult {
    /// Smallest evaluated group size reaching the target, `None` if none did.
    pub number_of_observations: Option<usize>,
    /// Power at the selected size, or the best power seen when no size qualified.
    pub achieved_power: f64,
    /// `(number_of_observations, power)` pairs in evaluation order.
    pub curve: Vec<(usize, f64)>,
}
