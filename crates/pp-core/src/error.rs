//! Error types for permpower

use thiserror::Error;

/// permpower error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A caller-supplied argument violates a documented precondition.
    ///
    /// Always raised before any value is drawn from a random stream.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The test statistic is undefined for the given samples (zero pooled variance).
    #[error("Undefined statistic: {0}")]
    UndefinedStatistic(String),

    /// Every permutation of a batch produced an undefined statistic.
    #[error("Exhausted resampling: {0}")]
    ExhaustedResampling(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

impl Error {
    /// `true` for errors that a single permutation may absorb as missing data.
    pub fn is_undefined_permutation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::UndefinedStatistic(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let e = Error::Validation("size must be strictly positive, was [0]".to_string());
        assert_eq!(e.to_string(), "Validation error: size must be strictly positive, was [0]");

        let e = Error::UndefinedStatistic("pooled variance of provided samples is 0".into());
        assert!(e.to_string().starts_with("Undefined statistic:"));
    }

    #[test]
    fn test_undefined_permutation_classification() {
        assert!(Error::Validation(String::new()).is_undefined_permutation());
        assert!(Error::UndefinedStatistic(String::new()).is_undefined_permutation());
        assert!(!Error::ExhaustedResampling(String::new()).is_undefined_permutation());
        assert!(!Error::Computation(String::new()).is_undefined_permutation());
    }

    #[test]
    fn test_json_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Json(_)));
    }
}
