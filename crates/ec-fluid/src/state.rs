//! Thermodynamic state definitions.

use crate::composition::Composition;
use crate::eos::{self, EosKind};
use crate::error::{FluidError, FluidResult};
use ec_core::units::{Density, Pressure, Temperature, pa};

/// Specific enthalpy [J/kg]. Not part of uom's standard set, so we use f64
/// with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// Pressure/temperature pair used to construct a `FluidState`
/// (`spec.md` §3 FluidState is always evaluated from (P, T, composition)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInput {
    pub p: Pressure,
    pub t: Temperature,
}

/// A fully evaluated thermodynamic state: pressure, temperature, and
/// composition, plus the EOS-derived properties `spec.md` §3 says are
/// "derived, cached": molar mass, density, specific enthalpy/entropy,
/// Z-factor, κ.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidState {
    p: Pressure,
    t: Temperature,
    comp: Composition,
    molar_mass: f64,
    rho: Density,
    h: SpecEnthalpy,
    s: SpecEntropy,
    cp: SpecHeatCapacity,
    z: f64,
    kappa: f64,
}

impl FluidState {
    /// Evaluate a fluid state at (P, T, composition) under the given EOS.
    pub fn evaluate(
        eos_kind: EosKind,
        p: Pressure,
        t: Temperature,
        comp: Composition,
    ) -> FluidResult<Self> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }

        let point = eos::evaluate(eos_kind, &comp, p.value, t.value)?;
        let molar_mass = comp.molar_mass();
        // M is kg/kmol == g/mol; convert molar [J/mol] quantities to
        // per-kg using (1000 mol/kmol) / M[kg/kmol].
        let mass_factor = 1000.0 / molar_mass;
        let rho_val = p.value * (molar_mass / 1000.0) / (point.z * 8.314_462_618 * t.value);

        Ok(Self {
            p,
            t,
            comp,
            molar_mass,
            rho: Density::new::<uom::si::mass_density::kilogram_per_cubic_meter>(rho_val),
            h: point.h_molar_j_per_mol * mass_factor,
            s: point.s_molar_j_per_mol_k * mass_factor,
            cp: point.cp_molar_j_per_mol_k * mass_factor,
            z: point.z,
            kappa: point.kappa,
        })
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    pub fn density(&self) -> Density {
        self.rho
    }

    /// Specific enthalpy [J/kg].
    pub fn enthalpy(&self) -> SpecEnthalpy {
        self.h
    }

    /// Specific entropy [J/(kg·K)].
    pub fn entropy(&self) -> SpecEntropy {
        self.s
    }

    /// Specific heat capacity at constant pressure [J/(kg·K)].
    pub fn cp(&self) -> SpecHeatCapacity {
        self.cp
    }

    /// Compressibility factor Z.
    pub fn z_factor(&self) -> f64 {
        self.z
    }

    /// Heat capacity ratio κ = cp/cv.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Build a new state at a different (P, T), same composition and EOS.
    pub fn with_pt(&self, eos_kind: EosKind, p: Pressure, t: Temperature) -> FluidResult<Self> {
        Self::evaluate(eos_kind, p, t, self.comp.clone())
    }
}

/// Construct a state from the legacy `StateInput::PT`-style pair; kept as a
/// thin convenience wrapper over [`FluidState::evaluate`].
pub fn state_from_pt(
    eos_kind: EosKind,
    input: StateInput,
    comp: Composition,
) -> FluidResult<FluidState> {
    FluidState::evaluate(eos_kind, input.p, input.t, comp)
}

/// Validate a standalone pressure value (used by stage/train crates before
/// constructing a `StateInput`).
pub fn validate_pressure(p_bar: f64) -> FluidResult<Pressure> {
    if !p_bar.is_finite() || p_bar <= 0.0 {
        return Err(FluidError::OutOfRange {
            what: "pressure must be positive and finite",
        });
    }
    Ok(pa(p_bar * 1.0e5))
}
