//! Maximum-rate solver (`spec.md` §4.F), enabled only when the model sets
//! `CALCULATE_MAX_RATE: true`.

use ec_core::numeric::bisect_feasibility;
use ec_fluid::FluidModel;

use crate::request::OperatingRequest;
use crate::train::Train;

/// Bisect on feasibility (monotone: larger standard rates are eventually
/// infeasible due to stonewall) to find the largest feasible mass rate
/// within `rel_tol` of the true boundary.
pub fn solve_max_rate(
    train: &Train,
    model: &dyn FluidModel,
    request_template: &OperatingRequest,
    mass_flow_upper_bound_kg_s: f64,
) -> f64 {
    let feasible = |mass_flow_kg_s: f64| -> bool {
        let mut request = request_template.clone();
        request.mass_flow_kg_s = mass_flow_kg_s;
        train.solve(model, &request).is_ok()
    };
    bisect_feasibility(0.0, mass_flow_upper_bound_kg_s, feasible, 1.0e-3, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PressureControlPolicy;
    use crate::train::SpeedMode;
    use ec_chart::{ChartCurve, CompressorChart, ControlMargin};
    use ec_core::units::{bar, celsius};
    use ec_fluid::{Composition, CubicFluidModel, EosKind};
    use ec_stage::Stage;
    use ec_turbine::ShaftConfig;

    #[test]
    fn scenario_s6_max_rate_converges_and_fails_above() {
        let curve = ChartCurve::new(
            7_500.0,
            vec![3_000.0, 4_000.0, 5_000.0],
            vec![8_500.0, 7_500.0, 6_500.0],
            vec![0.72, 0.74, 0.70],
        )
        .unwrap();
        let chart = CompressorChart::single_speed(curve, ControlMargin::none());
        let stage = Stage::new(celsius(30.0), chart, None).unwrap();
        let train = Train::new(
            vec![stage],
            PressureControlPolicy::DownstreamChoke,
            SpeedMode::Fixed(7_500.0),
            ShaftConfig::new(0.98).unwrap(),
            None,
            None,
        )
        .unwrap();

        let model = CubicFluidModel::new("dry-gas-srk", EosKind::Srk);
        let request = OperatingRequest {
            mass_flow_kg_s: 0.0,
            suction_pressure: bar(20.0),
            discharge_pressure_target: bar(80.0),
            interstage_pressure_target: None,
            inlet_composition: Composition::pure_methane(),
        };

        let upper_bound =
            ec_fluid::sm3_per_day_to_kg_per_s(&model, &Composition::pure_methane(), 5.0e6).unwrap();
        let max_rate = solve_max_rate(&train, &model, &request, upper_bound);
        assert!(max_rate > 0.0);

        let mut at_max = request.clone();
        at_max.mass_flow_kg_s = max_rate;
        assert!(train.solve(&model, &at_max).is_ok());

        let mut above_max = request.clone();
        above_max.mass_flow_kg_s = max_rate * 1.2;
        assert!(train.solve(&model, &above_max).is_err());
    }
}
