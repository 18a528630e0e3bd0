//! Error types for projection and allocation
//!
//! Every error is a deterministic function of the input data, so none of
//! them are worth retrying.

use thiserror::Error;

/// Errors raised by the projection engine and its components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Disease, region or ratio key absent from the lookup tables
    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    /// Horizon before the anchor end, non-monotonic anchors, or a year
    /// outside an extended series
    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    /// Undiagnosed ratio outside [0, 1]
    #[error("undiagnosed ratio {ratio} is outside [0, 1]")]
    InvalidRatio { ratio: f64 },

    /// Zero reference susceptible population
    #[error("division by zero: {context}")]
    DivisionByZero { context: String },

    /// Request, configuration or table value outside its allowed domain
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl ProjectionError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound { kind, key: key.into() }
    }

    pub(crate) fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange { reason: reason.into() }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_key() {
        let err = ProjectionError::not_found("disease", "Gout");
        assert_eq!(err.to_string(), "disease 'Gout' not found");

        let err = ProjectionError::InvalidRatio { ratio: 1.5 };
        assert!(err.to_string().contains("1.5"));
    }
}
