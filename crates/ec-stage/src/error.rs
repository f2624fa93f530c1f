//! Stage evaluation errors.

use ec_core::EcError;
use thiserror::Error;

pub type StageResult<T> = Result<T, StageError>;

/// Errors raised while constructing or evaluating a `Stage`
/// (`spec.md` §4.C).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("Stage inlet temperature must be positive: {value} K")]
    InvalidInletTemperature { value: f64 },

    #[error("Stage is infeasible: {what}")]
    InfeasibleHead { what: &'static str },

    #[error("Speed {speed:.1} rpm outside chart envelope [{n_min:.1}, {n_max:.1}]")]
    SpeedOutOfEnvelope {
        speed: f64,
        n_min: f64,
        n_max: f64,
        above: bool,
    },

    #[error(transparent)]
    Fluid(#[from] ec_fluid::FluidError),

    #[error(transparent)]
    Chart(#[from] ec_chart::ChartError),
}

impl From<StageError> for EcError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::InvalidInletTemperature { value } => EcError::InvalidArg {
                what: Box::leak(format!("invalid stage inlet temperature: {value} K").into_boxed_str()),
            },
            StageError::InfeasibleHead { what } => EcError::Invariant {
                what: Box::leak(format!("stage infeasible: {what}").into_boxed_str()),
            },
            StageError::Fluid(e) => e.into(),
            StageError::Chart(e) => e.into(),
        }
    }
}

/// Stage-result classification (`spec.md` §4.C Classification).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageClassification {
    Ok,
    SurgeRecycle,
    Stonewall,
    BelowMinSpeed,
    AboveMaxSpeed,
    InfeasibleHead,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StageError::InvalidInletTemperature { value: -1.0 };
        assert!(err.to_string().contains("-1"));
    }
}
