//! Standard-condition (Sm³) ↔ mass-rate conversions (`spec.md` §4.A
//! "Standard conditions", GLOSSARY "Sm³").

use crate::composition::Composition;
use crate::error::FluidResult;
use crate::model::FluidModel;
use ec_core::units::constants::{SECONDS_PER_DAY, STANDARD_PRESSURE_BAR, STANDARD_TEMPERATURE_K};
use ec_core::units::{Density, bar, k};

/// Density at standard conditions (1.01325 bar, 288.15 K) under the given
/// model's EOS — used to convert Sm³/day ↔ kg/s.
pub fn standard_density(model: &dyn FluidModel, comp: &Composition) -> FluidResult<Density> {
    let p = bar(STANDARD_PRESSURE_BAR);
    let t = k(STANDARD_TEMPERATURE_K);
    let state = model.state(p, t, comp.clone())?;
    Ok(state.density())
}

/// Convert a standard gas rate [Sm³/day] to mass rate [kg/s].
pub fn sm3_per_day_to_kg_per_s(
    model: &dyn FluidModel,
    comp: &Composition,
    sm3_per_day: f64,
) -> FluidResult<f64> {
    let rho_std = standard_density(model, comp)?;
    Ok(sm3_per_day * rho_std.value / SECONDS_PER_DAY)
}

/// Convert a mass rate [kg/s] to a standard gas rate [Sm³/day].
pub fn kg_per_s_to_sm3_per_day(
    model: &dyn FluidModel,
    comp: &Composition,
    kg_per_s: f64,
) -> FluidResult<f64> {
    let rho_std = standard_density(model, comp)?;
    Ok(kg_per_s * SECONDS_PER_DAY / rho_std.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::EosKind;
    use crate::model::CubicFluidModel;

    #[test]
    fn round_trip_sm3_and_mass_rate() {
        let model = CubicFluidModel::new("srk", EosKind::Srk);
        let comp = Composition::pure_methane();
        let sm3_per_day = 2.0e6;
        let kg_per_s = sm3_per_day_to_kg_per_s(&model, &comp, sm3_per_day).unwrap();
        let round_trip = kg_per_s_to_sm3_per_day(&model, &comp, kg_per_s).unwrap();
        assert!((round_trip - sm3_per_day).abs() / sm3_per_day < 1e-9);
    }

    #[test]
    fn standard_density_is_near_methane_std_density() {
        let model = CubicFluidModel::new("srk", EosKind::Srk);
        let comp = Composition::pure_methane();
        let rho = standard_density(&model, &comp).unwrap();
        // Methane standard density is ~0.68 kg/Sm3.
        assert!(rho.value > 0.5 && rho.value < 0.9);
    }
}
