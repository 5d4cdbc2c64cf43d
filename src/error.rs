//! Errors returned by the probability engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A caller supplied a value outside the function's domain.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// An intermediate or final value overflowed or became NaN.
    #[error("numeric instability in {context}")]
    NumericInstability { context: String },
}

impl EngineError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub fn unstable(context: impl Into<String>) -> Self {
        Self::NumericInstability {
            context: context.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// Rejects NaN, infinities and negative values.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(EngineError::invalid(name, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(EngineError::invalid(name, format!("must be >= 0, got {value}")));
    }
    Ok(value)
}

pub(crate) fn ensure_probability(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::invalid(
            name,
            format!("must be a probability in [0, 1], got {value}"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_argument() {
        let err = EngineError::invalid("odds", "must be > 1, got 0.9");
        assert_eq!(err.to_string(), "invalid argument `odds`: must be > 1, got 0.9");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn probability_bounds_are_inclusive() {
        assert!(ensure_probability("p", 0.0).is_ok());
        assert!(ensure_probability("p", 1.0).is_ok());
        assert!(ensure_probability("p", 1.0001).is_err());
        assert!(ensure_probability("p", f64::NAN).is_err());
    }
}
