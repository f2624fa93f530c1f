//! `SimplifiedVariableSpeedTrain`: each stage solved independently against
//! an assigned outlet pressure (`spec.md` §4.E "Simplified variable-speed
//! train").

use ec_core::numeric::{BrentConfig, brent_find_root};
use ec_core::units::to_bar;
use ec_fluid::FluidModel;
use ec_stage::{Stage, StageInput, evaluate as evaluate_stage};
use ec_turbine::ShaftConfig;

use crate::error::{EvaluationStatus, TrainError, TrainResult};
use crate::request::{OperatingRequest, OperatingResult, StageReport};

/// Solve each stage for its own speed, targeting an equal pressure ratio
/// per stage, `(P_d/P_s)^(1/N)`. No inter-stage speed constraint beyond
/// sequential composition and aftercooling.
///
/// `STAGES` count (N) determination from `MAXIMUM_PRESSURE_RATIO_PER_STAGE`
/// when the stage list is open-ended is a model-construction concern
/// (`ec_model`), not this solver's: by the time `stages` reaches here, N is
/// already fixed.
pub fn solve_simplified(
    stages: &[Stage],
    model: &dyn FluidModel,
    shaft: &ShaftConfig,
    request: &OperatingRequest,
    n_min: f64,
    n_max: f64,
) -> TrainResult<OperatingResult> {
    if stages.is_empty() {
        return Err(TrainError::EmptyTrain);
    }

    let n_stages = stages.len() as f64;
    let ratio_per_stage = (to_bar(request.discharge_pressure_target) / to_bar(request.suction_pressure))
        .powf(1.0 / n_stages);

    let mut inlet_pressure = request.suction_pressure;
    let mut total_gas_power_w = 0.0;
    let mut total_shaft_power_mw = 0.0;
    let mut stage_reports = Vec::with_capacity(stages.len());

    for (stage_index, stage) in stages.iter().enumerate() {
        let target_bar = to_bar(inlet_pressure) * ratio_per_stage;

        let residual = |n: f64| -> f64 {
            let input = StageInput {
                inlet_pressure,
                composition: request.inlet_composition.clone(),
                mass_flow_kg_s: request.mass_flow_kg_s,
                speed_rpm: n,
            };
            match evaluate_stage(stage, model, &input) {
                Ok(out) => to_bar(out.outlet_state.pressure()) - target_bar,
                Err(_) => -1.0e6,
            }
        };

        let brent = brent_find_root(n_min, n_max, residual, BrentConfig::default()).map_err(|_| {
            TrainError::Infeasible {
                what: "simplified train: stage cannot reach its assigned outlet pressure within its speed envelope",
            }
        })?;
        if !brent.converged {
            return Err(TrainError::DidNotConverge {
                what: "simplified train per-stage speed root-find",
            });
        }

        let input = StageInput {
            inlet_pressure,
            composition: request.inlet_composition.clone(),
            mass_flow_kg_s: request.mass_flow_kg_s,
            speed_rpm: brent.root,
        };
        let output = evaluate_stage(stage, model, &input)?;

        let stage_gas_mw = output.gas_power_w / 1.0e6;
        let stage_shaft_mw = shaft.shaft_power_mw(stage_gas_mw);
        total_gas_power_w += output.gas_power_w;
        total_shaft_power_mw += stage_shaft_mw;
        inlet_pressure = output.outlet_state.pressure();

        stage_reports.push(StageReport {
            stage_index,
            speed_rpm: brent.root,
            shaft_power_mw: stage_shaft_mw,
            output,
        });
    }

    Ok(OperatingResult {
        discharge_pressure_bar: to_bar(inlet_pressure),
        total_gas_power_mw: total_gas_power_w / 1.0e6,
        total_shaft_power_mw,
        asv_recycle_fraction: 0.0,
        stage_reports,
        status: EvaluationStatus::Ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_chart::{ChartCurve, CompressorChart, ControlMargin};
    use ec_core::units::{bar, celsius};
    use ec_fluid::{Composition, CubicFluidModel, EosKind};

    /// `SimplifiedVariableSpeedTrain`: independent per-stage speeds, each
    /// stage targeting an equal pressure ratio. Distinct from `spec.md` §8
    /// Scenario S3 (the true common-speed `VariableSpeedTrain`, covered in
    /// `train.rs`'s own test of the same name) — this train type has no
    /// shared-speed constraint between stages.
    #[test]
    fn simplified_train_two_stage_equal_ratio_solves_independent_speeds() {
        let curve_lo = ChartCurve::new(
            8_000.0,
            vec![5_000.0, 10_000.0, 15_000.0],
            vec![60_000.0, 80_000.0, 50_000.0],
            vec![0.70, 0.75, 0.70],
        )
        .unwrap();
        let curve_hi = ChartCurve::new(
            12_000.0,
            vec![5_000.0, 10_000.0, 15_000.0],
            vec![90_000.0, 120_000.0, 75_000.0],
            vec![0.70, 0.75, 0.70],
        )
        .unwrap();
        let chart = CompressorChart::variable_speed(vec![curve_lo, curve_hi], ControlMargin::none()).unwrap();
        let stage1 = Stage::new(celsius(30.0), chart.clone(), None).unwrap();
        let stage2 = Stage::new(celsius(30.0), chart, None).unwrap();

        let model = CubicFluidModel::new("dry-gas-srk", EosKind::Srk);
        let request = OperatingRequest {
            mass_flow_kg_s: ec_fluid::sm3_per_day_to_kg_per_s(&model, &Composition::pure_methane(), 4.0e6).unwrap(),
            suction_pressure: bar(20.0),
            discharge_pressure_target: bar(120.0),
            interstage_pressure_target: None,
            inlet_composition: Composition::pure_methane(),
        };

        let shaft = ec_turbine::ShaftConfig::new(0.98).unwrap();
        let result = solve_simplified(&[stage1, stage2], &model, &shaft, &request, 8_000.0, 12_000.0).unwrap();
        assert_eq!(result.stage_reports.len(), 2);
        assert!((result.discharge_pressure_bar - 120.0).abs() / 120.0 < 0.05);
    }
}
