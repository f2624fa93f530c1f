//! Shaft / mechanical-efficiency wrapper (`spec.md` §4.H).

use crate::error::{TurbineError, TurbineResult};

/// Converts gas power to shaft power via a fixed mechanical efficiency,
/// with support for the deprecated `POWER_ADJUSTMENT_FACTOR` /
/// `POWER_ADJUSTMENT_CONSTANT` model inputs (`spec.md` §9 DESIGN NOTES):
/// the factor is folded into η_mech as `η_mech = 1 / FACTOR`, and the
/// constant is a flat MW offset added only when stage shaft power is
/// positive — it is not itself physically meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaftConfig {
    mech_efficiency: f64,
    power_adjustment_constant_mw: f64,
}

impl ShaftConfig {
    pub fn new(mech_efficiency: f64) -> TurbineResult<Self> {
        Self::with_adjustment_constant(mech_efficiency, 0.0)
    }

    pub fn with_adjustment_constant(
        mech_efficiency: f64,
        power_adjustment_constant_mw: f64,
    ) -> TurbineResult<Self> {
        if !mech_efficiency.is_finite() || mech_efficiency <= 0.0 || mech_efficiency > 1.0 {
            return Err(TurbineError::InvalidMechanicalEfficiency {
                value: mech_efficiency,
            });
        }
        Ok(Self {
            mech_efficiency,
            power_adjustment_constant_mw,
        })
    }

    /// Build a config from the deprecated `POWER_ADJUSTMENT_FACTOR` /
    /// `POWER_ADJUSTMENT_CONSTANT` pair, logging a deprecation warning.
    pub fn from_power_adjustment(
        power_adjustment_factor: f64,
        power_adjustment_constant_mw: f64,
    ) -> TurbineResult<Self> {
        tracing::warn!(
            power_adjustment_factor,
            power_adjustment_constant_mw,
            "POWER_ADJUSTMENT_FACTOR/CONSTANT are deprecated; folding factor into mechanical efficiency"
        );
        if !power_adjustment_factor.is_finite() || power_adjustment_factor <= 0.0 {
            return Err(TurbineError::InvalidMechanicalEfficiency {
                value: power_adjustment_factor,
            });
        }
        Self::with_adjustment_constant(1.0 / power_adjustment_factor, power_adjustment_constant_mw)
    }

    pub fn mechanical_efficiency(&self) -> f64 {
        self.mech_efficiency
    }

    /// P_shaft = P_gas / η_mech, plus the (non-physical) adjustment
    /// constant when the result is positive.
    pub fn shaft_power_mw(&self, gas_power_mw: f64) -> f64 {
        let base = gas_power_mw / self.mech_efficiency;
        if base > 0.0 {
            base + self.power_adjustment_constant_mw
        } else {
            base
        }
    }
}
