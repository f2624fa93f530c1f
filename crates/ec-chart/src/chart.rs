//! Compressor chart: single- or variable-speed, with a surge-control margin
//! (`spec.md` §3 CompressorChart, §4.B chart queries).

use crate::curve::ChartCurve;
use crate::error::{ChartError, ChartResult};

/// Classification of a chart query result (`spec.md` §4.B, §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartClassification {
    Internal,
    BelowSurge,
    AboveStonewall,
}

/// Result of querying a chart at (Q, n).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartQuery {
    pub head_j_per_kg: f64,
    pub efficiency: f64,
    pub classification: ChartClassification,
    /// The effective surge-flow boundary at the queried speed, after the
    /// control margin shift.
    pub q_min_effective: f64,
    pub q_max: f64,
}

/// Surge control margin, declared as a fraction or percentage at model
/// load and always stored as a fraction internally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMargin(f64);

impl ControlMargin {
    pub fn from_fraction(fraction: f64) -> ChartResult<Self> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(ChartError::InvalidMargin { value: fraction });
        }
        Ok(Self(fraction))
    }

    pub fn from_percentage(percentage: f64) -> ChartResult<Self> {
        Self::from_fraction(percentage / 100.0)
    }

    pub fn none() -> Self {
        Self(0.0)
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }
}

/// A single- or variable-speed compressor chart
/// (`spec.md` §3: "SingleSpeed: exactly one ChartCurve"; "VariableSpeed:
/// >= 2 ChartCurves, speeds strictly increasing").
#[derive(Debug, Clone, PartialEq)]
pub struct CompressorChart {
    curves: Vec<ChartCurve>,
    margin: ControlMargin,
}

impl CompressorChart {
    pub fn single_speed(curve: ChartCurve, margin: ControlMargin) -> Self {
        Self {
            curves: vec![curve],
            margin,
        }
    }

    pub fn variable_speed(curves: Vec<ChartCurve>, margin: ControlMargin) -> ChartResult<Self> {
        if curves.len() < 2 {
            return Err(ChartError::InvalidCurve {
                what: "variable-speed chart requires at least two curves",
            });
        }
        for w in curves.windows(2) {
            if !(w[1].speed_rpm() > w[0].speed_rpm()) {
                return Err(ChartError::NonMonotoneSpeed);
            }
        }
        Ok(Self { curves, margin })
    }

    pub fn is_single_speed(&self) -> bool {
        self.curves.len() == 1
    }

    pub fn speed_envelope(&self) -> (f64, f64) {
        (
            self.curves.first().unwrap().speed_rpm(),
            self.curves.last().unwrap().speed_rpm(),
        )
    }

    pub fn margin(&self) -> ControlMargin {
        self.margin
    }

    /// `Q_min_effective = Q_min + margin * (Q_max - Q_min)` for one curve
    /// (`spec.md` §4.B).
    fn q_min_effective(&self, curve: &ChartCurve) -> f64 {
        curve.q_min() + self.margin.fraction() * (curve.q_max() - curve.q_min())
    }

    /// Query the chart at actual volumetric flow `q` [Am³/h] and speed `n`
    /// [rpm]. For single-speed charts `n` is ignored (the sole curve's own
    /// speed is authoritative).
    pub fn query(&self, q_am3_per_hour: f64, speed_rpm: f64) -> ChartResult<ChartQuery> {
        if self.is_single_speed() {
            self.query_single(q_am3_per_hour)
        } else {
            self.query_variable(q_am3_per_hour, speed_rpm)
        }
    }

    fn query_single(&self, q: f64) -> ChartResult<ChartQuery> {
        let curve = &self.curves[0];
        let q_min_eff = self.q_min_effective(curve);
        let q_max = curve.q_max();

        if q < q_min_eff {
            return Ok(ChartQuery {
                head_j_per_kg: curve.interpolate_head(q_min_eff),
                efficiency: curve.interpolate_efficiency(q_min_eff),
                classification: ChartClassification::BelowSurge,
                q_min_effective: q_min_eff,
                q_max,
            });
        }
        if q > q_max {
            return Ok(ChartQuery {
                head_j_per_kg: curve.interpolate_head(q_max),
                efficiency: curve.interpolate_efficiency(q_max),
                classification: ChartClassification::AboveStonewall,
                q_min_effective: q_min_eff,
                q_max,
            });
        }
        Ok(ChartQuery {
            head_j_per_kg: curve.interpolate_head(q),
            efficiency: curve.interpolate_efficiency(q),
            classification: ChartClassification::Internal,
            q_min_effective: q_min_eff,
            q_max,
        })
    }

    fn query_variable(&self, q: f64, n: f64) -> ChartResult<ChartQuery> {
        let (n_min, n_max) = self.speed_envelope();
        if n < n_min || n > n_max {
            return Err(ChartError::OutOfEnvelope {
                what: "speed outside [n_min, n_max]",
                q,
                n,
            });
        }

        let idx = self
            .curves
            .windows(2)
            .position(|w| n >= w[0].speed_rpm() && n <= w[1].speed_rpm())
            .unwrap_or(0);
        let lo = &self.curves[idx];
        let hi = &self.curves[idx + 1];

        let lambda = if (hi.speed_rpm() - lo.speed_rpm()).abs() < 1e-12 {
            0.0
        } else {
            (n - lo.speed_rpm()) / (hi.speed_rpm() - lo.speed_rpm())
        };

        let q_min_lo = self.q_min_effective(lo);
        let q_min_hi = self.q_min_effective(hi);
        let q_min_eff = q_min_lo + lambda * (q_min_hi - q_min_lo);
        let q_max_eff = lo.q_max() + lambda * (hi.q_max() - lo.q_max());

        let classification = if q < q_min_eff {
            ChartClassification::BelowSurge
        } else if q > q_max_eff {
            ChartClassification::AboveStonewall
        } else {
            ChartClassification::Internal
        };

        let q_eval = q.clamp(q_min_eff, q_max_eff);
        let h_lo = lo.interpolate_head(q_eval);
        let h_hi = hi.interpolate_head(q_eval);
        let eta_lo = lo.interpolate_efficiency(q_eval);
        let eta_hi = hi.interpolate_efficiency(q_eval);

        Ok(ChartQuery {
            head_j_per_kg: h_lo + lambda * (h_hi - h_lo),
            efficiency: eta_lo + lambda * (eta_hi - eta_lo),
            classification,
            q_min_effective: q_min_eff,
            q_max: q_max_eff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_speed_chart() -> CompressorChart {
        let curve = ChartCurve::new(
            7500.0,
            vec![3000.0, 4000.0, 5000.0],
            vec![8500.0, 7500.0, 6500.0],
            vec![0.72, 0.74, 0.70],
        )
        .unwrap();
        CompressorChart::single_speed(curve, ControlMargin::none())
    }

    #[test]
    fn single_speed_internal_classification() {
        let chart = single_speed_chart();
        let q = chart.query(4000.0, 7500.0).unwrap();
        assert_eq!(q.classification, ChartClassification::Internal);
    }

    #[test]
    fn single_speed_below_surge_classification() {
        let chart = single_speed_chart();
        let q = chart.query(2000.0, 7500.0).unwrap();
        assert_eq!(q.classification, ChartClassification::BelowSurge);
    }

    #[test]
    fn at_q_min_effective_exactly_ok_not_surge() {
        // Boundary behavior #10: at Q = Q_min_eff exactly, OK not SURGE_RECYCLE.
        let curve = ChartCurve::new(
            7500.0,
            vec![3000.0, 4000.0, 5000.0],
            vec![8500.0, 7500.0, 6500.0],
            vec![0.72, 0.74, 0.70],
        )
        .unwrap();
        let margin = ControlMargin::from_fraction(0.1).unwrap();
        let chart = CompressorChart::single_speed(curve, margin);
        let q_min_eff = 3000.0 + 0.1 * (5000.0 - 3000.0);
        let result = chart.query(q_min_eff, 7500.0).unwrap();
        assert_eq!(result.classification, ChartClassification::Internal);
    }

    #[test]
    fn single_speed_above_stonewall_classification() {
        let chart = single_speed_chart();
        let q = chart.query(6000.0, 7500.0).unwrap();
        assert_eq!(q.classification, ChartClassification::AboveStonewall);
    }

    #[test]
    fn variable_speed_requires_strictly_increasing_speeds() {
        let c1 = ChartCurve::new(7000.0, vec![3000.0, 4000.0], vec![8000.0, 7000.0], vec![0.7, 0.7]).unwrap();
        let c2 = ChartCurve::new(7000.0, vec![3000.0, 4000.0], vec![9000.0, 8000.0], vec![0.7, 0.7]).unwrap();
        let result = CompressorChart::variable_speed(vec![c1, c2], ControlMargin::none());
        assert!(result.is_err());
    }

    #[test]
    fn variable_speed_interpolates_between_curves() {
        let c1 = ChartCurve::new(7000.0, vec![3000.0, 5000.0], vec![8000.0, 6000.0], vec![0.7, 0.7]).unwrap();
        let c2 = ChartCurve::new(8000.0, vec![3000.0, 5000.0], vec![9000.0, 7000.0], vec![0.75, 0.75]).unwrap();
        let chart = CompressorChart::variable_speed(vec![c1, c2], ControlMargin::none()).unwrap();

        let q = chart.query(4000.0, 7500.0).unwrap();
        assert_eq!(q.classification, ChartClassification::Internal);
        // Midway in speed between the two curves' heads at Q=4000 (7000, 8000).
        assert!((q.head_j_per_kg - 7500.0).abs() < 1e-6);
    }

    #[test]
    fn variable_speed_rejects_out_of_speed_envelope() {
        let c1 = ChartCurve::new(7000.0, vec![3000.0, 5000.0], vec![8000.0, 6000.0], vec![0.7, 0.7]).unwrap();
        let c2 = ChartCurve::new(8000.0, vec![3000.0, 5000.0], vec![9000.0, 7000.0], vec![0.75, 0.75]).unwrap();
        let chart = CompressorChart::variable_speed(vec![c1, c2], ControlMargin::none()).unwrap();
        assert!(chart.query(4000.0, 9000.0).is_err());
    }
}
