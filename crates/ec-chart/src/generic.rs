//! Generic "universal" chart realization (`spec.md` §4.B Generic charts).
//!
//! Per §9 DESIGN NOTES ("Generic chart first-use fixing"), the design
//! point is resolved by the caller *before* entering the solver — there is
//! no lazy, mutable "freeze on first use" here, since that would race
//! under parallel period evaluation. [`realize`] always takes an explicit
//! design point; callers implementing `GENERIC_FROM_INPUT` compute that
//! point from the first period's inputs themselves and pass it in once.

use crate::chart::{CompressorChart, ControlMargin};
use crate::curve::ChartCurve;
use crate::error::ChartResult;

/// One point of the dimensionless shape: `(q*, h*)` with `q* in [0, 1.5]`,
/// `h* in [0, 1.3]`.
pub type ShapePoint = (f64, f64);

/// The canonical dimensionless centrifugal-compressor shape: monotone
/// non-increasing in `q*`, with `(q*, h*) = (1.0, 1.0)` marking the design
/// point by construction.
pub fn canonical_shape() -> Vec<ShapePoint> {
    vec![
        (0.50, 1.25),
        (0.70, 1.18),
        (0.85, 1.08),
        (1.00, 1.00),
        (1.15, 0.88),
        (1.30, 0.70),
        (1.50, 0.40),
    ]
}

/// Relative speeds the generic shape is realized at (`spec.md` §4.B:
/// "for a set of relative speeds {0.5, ..., 1.1}").
pub const RELATIVE_SPEEDS: [f64; 7] = [0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.1];

/// A nominal reference speed [rpm] used only to give the realized curves a
/// concrete, strictly-increasing speed axis; affinity laws make the
/// physical result independent of this choice.
pub const NOMINAL_DESIGN_SPEED_RPM: f64 = 10_000.0;

/// Realize a generic chart into a `VariableSpeed` chart at the given
/// design point `(Q_d, H_d)`, using affinity laws `Q ∝ n`, `H ∝ n²`
/// (`spec.md` §4.B): for relative speed `s`, `Q_s(q*) = s · q* · Q_d`,
/// `H_s(q*) = s² · h* · H_d`. Efficiency is the chart's single fixed
/// polytropic efficiency at every point (`spec.md` §4.B: "parameterized
/// only by a fixed polytropic efficiency").
pub fn realize(
    shape: &[ShapePoint],
    efficiency: f64,
    q_design_am3_per_hour: f64,
    h_design_j_per_kg: f64,
    margin: ControlMargin,
) -> ChartResult<CompressorChart> {
    let mut curves = Vec::with_capacity(RELATIVE_SPEEDS.len());
    for &s in RELATIVE_SPEEDS.iter() {
        let speed_rpm = s * NOMINAL_DESIGN_SPEED_RPM;
        let q: Vec<f64> = shape.iter().map(|(qs, _)| s * qs * q_design_am3_per_hour).collect();
        let h: Vec<f64> = shape
            .iter()
            .map(|(_, hs)| s * s * hs * h_design_j_per_kg)
            .collect();
        let eta = vec![efficiency; shape.len()];
        curves.push(ChartCurve::new(speed_rpm, q, h, eta)?);
    }
    CompressorChart::variable_speed(curves, margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_point_round_trips_within_tolerance() {
        // Round-trip law #8: querying at (Q_d, n_design) returns H_d.
        let shape = canonical_shape();
        let q_d = 10_000.0;
        let h_d = 80_000.0;
        let chart = realize(&shape, 0.80, q_d, h_d, ControlMargin::none()).unwrap();

        let n_design = 1.0 * NOMINAL_DESIGN_SPEED_RPM;
        let result = chart.query(q_d, n_design).unwrap();
        assert!((result.head_j_per_kg - h_d).abs() / h_d < 1e-6);
    }

    #[test]
    fn rescaling_design_point_is_idempotent_in_shape() {
        let shape = canonical_shape();
        let chart_a = realize(&shape, 0.80, 10_000.0, 80_000.0, ControlMargin::none()).unwrap();
        let chart_b = realize(&shape, 0.80, 20_000.0, 80_000.0, ControlMargin::none()).unwrap();

        // Doubling Q_d should double the flow at every matched speed.
        let qa = chart_a.query(5_000.0, NOMINAL_DESIGN_SPEED_RPM).unwrap();
        let qb = chart_b.query(10_000.0, NOMINAL_DESIGN_SPEED_RPM).unwrap();
        assert!((qa.head_j_per_kg - qb.head_j_per_kg).abs() < 1e-6);
    }
}
