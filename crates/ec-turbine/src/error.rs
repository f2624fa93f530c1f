//! Turbine/shaft errors.

use ec_core::EcError;
use thiserror::Error;

pub type TurbineResult<T> = Result<T, TurbineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TurbineError {
    #[error("turbine load curve requires strictly increasing loads and at least two points")]
    InvalidLoadCurve,

    #[error("turbine load {load_mw} MW outside [0, {max_load_mw}] MW")]
    LoadOutOfRange { load_mw: f64, max_load_mw: f64 },

    #[error("mechanical efficiency must lie in (0, 1]: got {value}")]
    InvalidMechanicalEfficiency { value: f64 },

    #[error("lower heating value must be positive and finite: got {value}")]
    InvalidLowerHeatingValue { value: f64 },
}

impl From<TurbineError> for EcError {
    fn from(err: TurbineError) -> Self {
        match err {
            TurbineError::InvalidLoadCurve => EcError::InvalidArg {
                what: "turbine load curve requires strictly increasing loads and at least two points",
            },
            TurbineError::LoadOutOfRange { load_mw, max_load_mw } => EcError::Invariant {
                what: Box::leak(
                    format!("turbine load {load_mw} MW outside [0, {max_load_mw}] MW").into_boxed_str(),
                ),
            },
            TurbineError::InvalidMechanicalEfficiency { value } => EcError::InvalidArg {
                what: Box::leak(
                    format!("mechanical efficiency must lie in (0, 1]: got {value}").into_boxed_str(),
                ),
            },
            TurbineError::InvalidLowerHeatingValue { value } => EcError::InvalidArg {
                what: Box::leak(format!("invalid lower heating value: {value}").into_boxed_str()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TurbineError::LoadOutOfRange {
            load_mw: 42.0,
            max_load_mw: 20.0,
        };
        assert!(err.to_string().contains("42"));
    }
}
