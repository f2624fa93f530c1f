//! Mixing of flowing streams (`spec.md` §4.A "Mixing of streams").

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::FluidModel;
use crate::state::FluidState;
use ec_core::numeric::{BrentConfig, brent_find_root};
use ec_core::units::{Pressure, Temperature, k, pa};

/// One inlet to a mixing junction.
#[derive(Debug, Clone)]
pub struct MixInlet {
    pub mass_rate_kg_s: f64,
    pub p: Pressure,
    pub t: Temperature,
    pub comp: Composition,
}

/// Mix two or more flowing streams: mole-average the composition by molar
/// rate, then solve the mixed temperature by an enthalpy balance bracketed
/// on `[min(T) - 20, max(T) + 20]` K (`spec.md` §4.A).
pub fn mix_streams(model: &dyn FluidModel, inlets: &[MixInlet]) -> FluidResult<FluidState> {
    if inlets.len() < 2 {
        return Err(FluidError::InvalidArg {
            what: "mixing requires at least two inlets",
        });
    }

    let p_ref = inlets[0].p.value;
    for inlet in inlets {
        if (inlet.p.value - p_ref).abs() > 1.0 {
            return Err(FluidError::MismatchedMixingPressure);
        }
    }
    let p_mix = pa(p_ref);

    let total_mass_rate: f64 = inlets.iter().map(|i| i.mass_rate_kg_s).sum();
    if total_mass_rate <= 0.0 {
        return Err(FluidError::InvalidArg {
            what: "total mixed mass rate must be positive",
        });
    }

    // Mole-average the composition, weighting by each inlet's molar rate
    // (mass rate / molar mass).
    let mut mixed = inlets[0].comp.clone();
    let mut mixed_molar_rate = inlets[0].mass_rate_kg_s / inlets[0].comp.molar_mass();
    for inlet in &inlets[1..] {
        let molar_rate = inlet.mass_rate_kg_s / inlet.comp.molar_mass();
        mixed = mixed.mole_average(mixed_molar_rate, &inlet.comp, molar_rate)?;
        mixed_molar_rate += molar_rate;
    }

    let t_min = inlets
        .iter()
        .map(|i| i.t.value)
        .fold(f64::INFINITY, f64::min);
    let t_max = inlets
        .iter()
        .map(|i| i.t.value)
        .fold(f64::NEG_INFINITY, f64::max);

    let target_h_flux: FluidResult<f64> = inlets.iter().try_fold(0.0, |acc, inlet| {
        let state = model.state(inlet.p, inlet.t, inlet.comp.clone())?;
        Ok(acc + inlet.mass_rate_kg_s * state.enthalpy())
    });
    let target_h_flux = target_h_flux?;

    let residual = |t_k: f64| -> f64 {
        match model.state(p_mix, k(t_k), mixed.clone()) {
            Ok(state) => total_mass_rate * state.enthalpy() - target_h_flux,
            Err(_) => f64::NAN,
        }
    };

    let lo = t_min - 20.0;
    let hi = t_max + 20.0;
    let f_lo = residual(lo);
    let f_hi = residual(hi);
    if !f_lo.is_finite() || !f_hi.is_finite() || f_lo.signum() == f_hi.signum() {
        return Err(FluidError::MixingEnergyBalanceNoBracket);
    }

    let config = BrentConfig {
        abs_tol: 1e-6,
        rel_tol: 1e-9,
        max_iterations: 100,
    };
    let result = brent_find_root(lo, hi, residual, config)
        .map_err(|_| FluidError::ConvergenceFailed {
            what: "mixed-stream temperature",
        })?;
    if !result.converged {
        return Err(FluidError::ConvergenceFailed {
            what: "mixed-stream temperature",
        });
    }

    model.state(p_mix, k(result.root), mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::EosKind;
    use crate::model::CubicFluidModel;
    use ec_core::numeric::{Tolerances, nearly_equal};
    use ec_core::units::{bar, celsius};

    #[test]
    fn mixing_identical_streams_reproduces_composition() {
        let model = CubicFluidModel::new("srk", EosKind::Srk);
        let comp = Composition::pure_methane();
        let inlets = vec![
            MixInlet {
                mass_rate_kg_s: 5.0,
                p: bar(50.0),
                t: celsius(40.0),
                comp: comp.clone(),
            },
            MixInlet {
                mass_rate_kg_s: 5.0,
                p: bar(50.0),
                t: celsius(40.0),
                comp: comp.clone(),
            },
        ];

        let mixed = mix_streams(&model, &inlets).unwrap();
        let tol = Tolerances {
            abs: 1e-6,
            rel: 1e-6,
        };
        assert!(nearly_equal(mixed.temperature().value, celsius(40.0).value, tol));
    }

    #[test]
    fn mismatched_pressure_is_rejected() {
        let model = CubicFluidModel::new("srk", EosKind::Srk);
        let comp = Composition::pure_methane();
        let inlets = vec![
            MixInlet {
                mass_rate_kg_s: 5.0,
                p: bar(50.0),
                t: celsius(40.0),
                comp: comp.clone(),
            },
            MixInlet {
                mass_rate_kg_s: 5.0,
                p: bar(60.0),
                t: celsius(40.0),
                comp,
            },
        ];

        let result = mix_streams(&model, &inlets);
        assert!(matches!(result, Err(FluidError::MismatchedMixingPressure)));
    }

    #[test]
    fn mixing_hotter_and_colder_stream_lands_between() {
        let model = CubicFluidModel::new("srk", EosKind::Srk);
        let comp = Composition::pure_methane();
        let inlets = vec![
            MixInlet {
                mass_rate_kg_s: 3.0,
                p: bar(50.0),
                t: celsius(20.0),
                comp: comp.clone(),
            },
            MixInlet {
                mass_rate_kg_s: 3.0,
                p: bar(50.0),
                t: celsius(80.0),
                comp,
            },
        ];

        let mixed = mix_streams(&model, &inlets).unwrap();
        let t_mix_c = ec_core::units::to_celsius(mixed.temperature());
        assert!(t_mix_c > 20.0 && t_mix_c < 80.0);
    }
}
