//! Turbine load → efficiency → fuel-rate conversion (`spec.md` §4.G).

use crate::error::{TurbineError, TurbineResult};

/// Piecewise-linear load→efficiency curve and a lower heating value.
///
/// `lhv_mj_per_sm3` is the fuel gas's lower heating value on a *volumetric*
/// basis (MJ/Sm³), the convention used throughout `spec.md` §8's worked
/// example. A model declaring LHV on a mass basis (MJ/kg) should convert it
/// to a volumetric basis via the fuel gas's standard density
/// (`ec_fluid::standard_density`) before constructing a `TurbineCurve`.
#[derive(Debug, Clone, PartialEq)]
pub struct TurbineCurve {
    loads_mw: Vec<f64>,
    efficiencies: Vec<f64>,
    lhv_mj_per_sm3: f64,
}

impl TurbineCurve {
    pub fn new(loads_mw: Vec<f64>, efficiencies: Vec<f64>, lhv_mj_per_sm3: f64) -> TurbineResult<Self> {
        if loads_mw.len() < 2 || loads_mw.len() != efficiencies.len() {
            return Err(TurbineError::InvalidLoadCurve);
        }
        for w in loads_mw.windows(2) {
            if !(w[1] > w[0]) {
                return Err(TurbineError::InvalidLoadCurve);
            }
        }
        if loads_mw[0] < 0.0 {
            return Err(TurbineError::InvalidLoadCurve);
        }
        if !lhv_mj_per_sm3.is_finite() || lhv_mj_per_sm3 <= 0.0 {
            return Err(TurbineError::InvalidLowerHeatingValue { value: lhv_mj_per_sm3 });
        }
        Ok(Self {
            loads_mw,
            efficiencies,
            lhv_mj_per_sm3,
        })
    }

    pub fn max_load_mw(&self) -> f64 {
        *self.loads_mw.last().unwrap()
    }

    /// Linear interpolation of efficiency at a bracketed load.
    fn efficiency_at(&self, load_mw: f64) -> f64 {
        let idx = self
            .loads_mw
            .windows(2)
            .position(|w| load_mw >= w[0] && load_mw <= w[1])
            .unwrap_or(self.loads_mw.len() - 2);
        let (l0, l1) = (self.loads_mw[idx], self.loads_mw[idx + 1]);
        let (e0, e1) = (self.efficiencies[idx], self.efficiencies[idx + 1]);
        if (l1 - l0).abs() < 1e-12 {
            e0
        } else {
            e0 + (load_mw - l0) / (l1 - l0) * (e1 - e0)
        }
    }

    /// Convert shaft power [MW] to fuel rate [Sm³/day].
    ///
    /// Fuel rate = `P_shaft · 86400 / (η(P_shaft) · LHV)` (`spec.md` §4.G).
    /// Exact zero load returns zero fuel without consulting the curve.
    pub fn fuel_rate_sm3_per_day(&self, shaft_power_mw: f64) -> TurbineResult<f64> {
        if shaft_power_mw == 0.0 {
            return Ok(0.0);
        }
        if shaft_power_mw < 0.0 || shaft_power_mw > self.max_load_mw() {
            return Err(TurbineError::LoadOutOfRange {
                load_mw: shaft_power_mw,
                max_load_mw: self.max_load_mw(),
            });
        }
        let eta = self.efficiency_at(shaft_power_mw);
        if eta <= 0.0 {
            return Err(TurbineError::LoadOutOfRange {
                load_mw: shaft_power_mw,
                max_load_mw: self.max_load_mw(),
            });
        }
        Ok(shaft_power_mw * ec_core::units::constants::SECONDS_PER_DAY / (eta * self.lhv_mj_per_sm3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_example_curve() -> TurbineCurve {
        TurbineCurve::new(vec![0.0, 10.0, 20.0], vec![0.0, 0.30, 0.36], 38.0).unwrap()
    }

    #[test]
    fn matches_worked_example() {
        let curve = worked_example_curve();
        let fuel = curve.fuel_rate_sm3_per_day(15.0).unwrap();
        let expected = 15.0 * 86_400.0 / (0.33 * 38.0);
        assert!((fuel - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn exact_zero_load_is_zero_fuel() {
        let curve = worked_example_curve();
        assert_eq!(curve.fuel_rate_sm3_per_day(0.0).unwrap(), 0.0);
    }

    #[test]
    fn negative_load_out_of_range() {
        let curve = worked_example_curve();
        assert!(curve.fuel_rate_sm3_per_day(-1.0).is_err());
    }

    #[test]
    fn above_max_load_out_of_range() {
        let curve = worked_example_curve();
        assert!(curve.fuel_rate_sm3_per_day(25.0).is_err());
    }

    #[test]
    fn rejects_non_increasing_loads() {
        let result = TurbineCurve::new(vec![0.0, 10.0, 5.0], vec![0.0, 0.3, 0.35], 38.0);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_positive_lhv() {
        let result = TurbineCurve::new(vec![0.0, 10.0], vec![0.0, 0.3], -1.0);
        assert!(result.is_err());
    }
}
