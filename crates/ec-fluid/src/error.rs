//! Fluid property errors.

use ec_core::EcError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during composition validation and EOS evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Composition is missing methane, has a negative fraction, or sums to zero
    /// (`spec.md` §4.A Failure modes: `CompositionInvalid`).
    #[error("Composition invalid: {what}")]
    CompositionInvalid { what: &'static str },

    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of valid range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Operation not supported by this model.
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// The cubic EOS has no real gas root in `Z ∈ [0, 10]`
    /// (`spec.md` §4.A Root selection; `SinglePhaseViolated`/`CubicNoGasRoot`).
    #[error("No gas-phase root found for cubic EOS at given (P, T, x)")]
    CubicNoGasRoot,

    /// Two streams being mixed report different pressures
    /// (`spec.md` §4.A Mixing of streams: `MismatchedMixingPressure`).
    #[error("Mixing streams at different pressures is not supported")]
    MismatchedMixingPressure,

    /// The enthalpy-balance bracket `[min(T) - 20, max(T) + 20]` does not
    /// straddle a root (`spec.md` §4.A: `MixingEnergyBalanceNoBracket`).
    #[error("Mixing energy balance has no bracketing temperature root")]
    MixingEnergyBalanceNoBracket,

    /// Convergence failure (e.g. solving for the mixed temperature).
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },
}

impl From<FluidError> for EcError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::CompositionInvalid { what } => EcError::InvalidArg {
                what: Box::leak(format!("composition invalid: {what}").into_boxed_str()),
            },
            FluidError::NonPhysical { what } => EcError::Invariant {
                what: Box::leak(format!("non-physical fluid value: {what}").into_boxed_str()),
            },
            FluidError::OutOfRange { what } => EcError::InvalidArg {
                what: Box::leak(format!("fluid value out of range: {what}").into_boxed_str()),
            },
            FluidError::InvalidArg { what } => EcError::InvalidArg {
                what: Box::leak(format!("invalid fluid argument: {what}").into_boxed_str()),
            },
            FluidError::NotSupported { what } => EcError::Invariant {
                what: Box::leak(format!("fluid operation not supported: {what}").into_boxed_str()),
            },
            FluidError::CubicNoGasRoot => EcError::Invariant {
                what: "cubic EOS has no gas-phase root",
            },
            FluidError::MismatchedMixingPressure => EcError::InvalidArg {
                what: "mixing streams at different pressures",
            },
            FluidError::MixingEnergyBalanceNoBracket => EcError::DidNotConverge {
                what: "mixing energy balance bracket",
            },
            FluidError::ConvergenceFailed { what } => EcError::DidNotConverge {
                what: Box::leak(format!("fluid convergence failed: {what}").into_boxed_str()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "pressure" };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::CubicNoGasRoot;
        assert!(err.to_string().contains("gas-phase"));
    }

    #[test]
    fn error_to_ec_error() {
        let fluid_err = FluidError::NotSupported { what: "mixtures" };
        let ec_err: EcError = fluid_err.into();
        assert!(matches!(ec_err, EcError::Invariant { .. }));
    }
}
