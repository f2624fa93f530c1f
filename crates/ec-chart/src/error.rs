//! Chart construction and query errors.

use ec_core::EcError;
use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Errors raised while constructing or querying a `CompressorChart`
/// (`spec.md` §4.B; §7 `ModelInvalid`: "chart non-monotone").
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Chart curve invalid: {what}")]
    InvalidCurve { what: &'static str },

    #[error("Variable-speed chart speeds must be strictly increasing")]
    NonMonotoneSpeed,

    #[error("Query (Q={q:.3}, n={n:.1}) is outside the chart envelope: {what}")]
    OutOfEnvelope {
        what: &'static str,
        q: f64,
        n: f64,
    },

    #[error("Control margin must be a fraction in [0, 1): got {value}")]
    InvalidMargin { value: f64 },

    #[error("Root-finder on chart data did not converge: {what}")]
    DidNotConverge { what: &'static str },
}

impl From<ChartError> for EcError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::InvalidCurve { what } => EcError::InvalidArg {
                what: Box::leak(format!("chart curve invalid: {what}").into_boxed_str()),
            },
            ChartError::NonMonotoneSpeed => EcError::InvalidArg {
                what: "variable-speed chart speeds not strictly increasing",
            },
            ChartError::OutOfEnvelope { what, .. } => EcError::Invariant {
                what: Box::leak(format!("chart query outside envelope: {what}").into_boxed_str()),
            },
            ChartError::InvalidMargin { .. } => EcError::InvalidArg {
                what: "control margin out of range",
            },
            ChartError::DidNotConverge { what } => EcError::DidNotConverge { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ChartError::NonMonotoneSpeed;
        assert!(err.to_string().contains("strictly increasing"));
    }
}
