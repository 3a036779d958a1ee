//! Immutable, finite-only numeric vector.
//!
//! [`NumericVector`] is the value type every other component exchanges. It owns an
//! `Arc<[f64]>`, so clones are cheap and the contents can never be mutated after
//! construction: constructors copy (or take ownership of) the caller's buffer.
//!
//! Dimensionality and element type are fixed by the Rust types involved; the only
//! runtime invariant is finiteness, checked at construction.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One-dimensional vector of finite `f64` values.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct NumericVector {
    data: Arc<[f64]>,
}

impl NumericVector {
    /// Build a vector from owned data.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if any element is NaN or infinite.
    pub fn new(data: Vec<f64>) -> Result<Self> {
        check_finite(&data)?;
        Ok(Self { data: Arc::from(data) })
    }

    /// Build a vector by copying a slice.
    pub fn from_slice(data: &[f64]) -> Result<Self> {
        check_finite(data)?;
        Ok(Self { data: Arc::from(data) })
    }

    /// Build a vector from any sequence of values convertible to `f64`.
    pub fn from_sequence<I, T>(sequence: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        Self::new(sequence.into_iter().map(Into::into).collect())
    }

    /// The empty vector.
    pub fn empty() -> Self {
        Self { data: Arc::from(Vec::<f64>::new()) }
    }

    /// Flatten zero or more vectors, in order, into one.
    pub fn concatenate<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a NumericVector>,
    {
        let data: Vec<f64> = vectors.into_iter().flat_map(|v| v.data.iter().copied()).collect();
        // Every input is already finite.
        Self { data: Arc::from(data) }
    }

    /// Read-only view of the elements.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the vector has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the elements by value.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Copy the elements into a fresh `Vec`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.to_vec()
    }

    /// Partition at `index` with slice-style clamping.
    ///
    /// Negative indices count from the end. `index <= -len` yields `(empty, all)` and
    /// `index >= len` yields `(all, empty)`; this never fails.
    pub fn split(&self, index: isize) -> (Self, Self) {
        let at = split_point(self.len(), index);
        let (head, tail) = self.data.split_at(at);
        (Self { data: Arc::from(head) }, Self { data: Arc::from(tail) })
    }
}

fn split_point(len: usize, index: isize) -> usize {
    let n = isize::try_from(len).unwrap_or(isize::MAX);
    let at = if index < 0 { n.saturating_add(index).max(0) } else { index.min(n) };
    // `at` is within [0, n] here.
    at as usize
}

fn check_finite(data: &[f64]) -> Result<()> {
    match data.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(i) => Err(Error::Validation(format!(
            "data must contain finite elements, element [{i}] was [{}]",
            data[i]
        ))),
    }
}

impl Default for NumericVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<f64>> for NumericVector {
    type Error = Error;

    fn try_from(data: Vec<f64>) -> Result<Self> {
        Self::new(data)
    }
}

impl TryFrom<&[f64]> for NumericVector {
    type Error = Error;

    fn try_from(data: &[f64]) -> Result<Self> {
        Self::from_slice(data)
    }
}

impl From<NumericVector> for Vec<f64> {
    fn from(vector: NumericVector) -> Self {
        vector.to_vec()
    }
}

impl AsRef<[f64]> for NumericVector {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

impl PartialEq for NumericVector {
    fn eq(&self, other: &Self) -> bool {
        self.data[..] == other.data[..]
    }
}

// Elements are finite, so `==` is reflexive.
impl Eq for NumericVector {}

impl Hash for NumericVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.data.len());
        for &v in self.data.iter() {
            // -0.0 == 0.0, so both must hash alike.
            let canonical = if v == 0.0 { 0.0f64 } else { v };
            state.write_u64(canonical.to_bits());
        }
    }
}

impl fmt::Display for NumericVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &self.data[..])
    }
}

impl fmt::Debug for NumericVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NumericVector{self}")
    }
}

/// Ordered pair of samples under test.
///
/// Order matters: the one-sided alternative is "first mean > second mean", and the
/// sign of the t-statistic follows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplePair {
    samples: [NumericVector; 2],
}

impl SamplePair {
    /// Pair two samples, `first` being the group whose mean is hypothesised larger.
    pub fn new(first: NumericVector, second: NumericVector) -> Self {
        Self { samples: [first, second] }
    }

    /// First group.
    pub fn first(&self) -> &NumericVector {
        &self.samples[0]
    }

    /// Second group.
    pub fn second(&self) -> &NumericVector {
        &self.samples[1]
    }

    /// Both samples as a slice, first then second.
    pub fn as_slice(&self) -> &[NumericVector] {
        &self.samples
    }

    /// Combined number of observations.
    pub fn total_len(&self) -> usize {
        self.samples[0].len() + self.samples[1].len()
    }

    /// Take the samples apart.
    pub fn into_parts(self) -> (NumericVector, NumericVector) {
        let [first, second] = self.samples;
        (first, second)
    }
}

impl From<(NumericVector, NumericVector)> for SamplePair {
    fn from((first, second): (NumericVector, NumericVector)) -> Self {
        Self::new(first, second)
    }
}
