//! Fluid model: binds a composition-independent EOS choice to state queries.

use crate::composition::Composition;
use crate::eos::EosKind;
use crate::error::FluidResult;
use crate::state::FluidState;
use ec_core::units::{Pressure, Temperature};

/// A fluid property model: an EOS tag plus a human-readable name
/// (`spec.md` §3: "EOS tag ... lives on the *fluid model*, not the state").
///
/// Implementations must be `Send + Sync` so the time-series driver can
/// evaluate periods in parallel over shared, read-only model data.
pub trait FluidModel: Send + Sync {
    /// Model name, for diagnostics.
    fn name(&self) -> &str;

    /// The cubic EOS variant this model evaluates states with.
    fn eos_kind(&self) -> EosKind;

    /// Evaluate a fluid state at (P, T, composition).
    fn state(&self, p: Pressure, t: Temperature, comp: Composition) -> FluidResult<FluidState>;
}

/// The sole `FluidModel` implementation: a direct cubic-EOS evaluator. GERG
/// variants resolve to plain SRK/PR (`spec.md` §4.A: "a minimum-viable
/// implementation may fall back to plain SRK/PR").
#[derive(Debug, Clone)]
pub struct CubicFluidModel {
    name: String,
    eos: EosKind,
}

impl CubicFluidModel {
    pub fn new(name: impl Into<String>, eos: EosKind) -> Self {
        Self {
            name: name.into(),
            eos,
        }
    }
}

impl FluidModel for CubicFluidModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn eos_kind(&self) -> EosKind {
        self.eos
    }

    fn state(&self, p: Pressure, t: Temperature, comp: Composition) -> FluidResult<FluidState> {
        FluidState::evaluate(self.eos, p, t, comp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;
    use ec_core::units::{k, pa};

    #[test]
    fn cubic_model_evaluates_state() {
        let model = CubicFluidModel::new("srk-dry-gas", EosKind::Srk);
        let state = model
            .state(pa(50.0e5), k(310.0), Composition::pure_methane())
            .unwrap();
        assert!(state.density().value > 0.0);
        assert!(state.kappa() > 1.0);
    }

    #[test]
    fn model_name_and_eos_kind_roundtrip() {
        let model = CubicFluidModel::new("pr-export-gas", EosKind::Pr);
        assert_eq!(model.name(), "pr-export-gas");
        assert_eq!(model.eos_kind(), EosKind::Pr);
    }
}
