//! The time-series driver loop (`spec.md` §4.I, §5).

use std::sync::atomic::{AtomicUsize, Ordering};

use ec_core::units::bar;
use ec_fluid::sm3_per_day_to_kg_per_s;
use ec_model::{ExprContext, ExprNode, InstallationDef};
use ec_train::{EvaluationStatus, OperatingRequest, OperatingResult, TrainError};
use ec_turbine::TurbineCurve;
use rayon::prelude::*;

use crate::build::{BuiltTrain, TrainSolveStrategy};
use crate::cancellation::CancellationToken;
use crate::error::{DriverError, DriverResult};
use crate::progress::{ProgressEvent, ProgressSink};

/// An installation's rate/pressure/condition expressions, parsed into
/// tagged-node trees once at model-load time (`spec.md` §9 DESIGN NOTES)
/// rather than re-parsed per period.
pub struct InstallationProgram {
    pub name: String,
    pub rate_sm3_per_day: ExprNode,
    pub suction_pressure_bar: ExprNode,
    pub discharge_pressure_bar: ExprNode,
    pub interstage_pressure_bar: Option<ExprNode>,
    pub condition: Option<ExprNode>,
}

pub fn compile_installation(def: &InstallationDef) -> DriverResult<InstallationProgram> {
    Ok(InstallationProgram {
        name: def.name.clone(),
        rate_sm3_per_day: ec_model::expr::parse(&def.rate_expr)?,
        suction_pressure_bar: ec_model::expr::parse(&def.suction_pressure_expr)?,
        discharge_pressure_bar: ec_model::expr::parse(&def.discharge_pressure_expr)?,
        interstage_pressure_bar: def
            .interstage_pressure_expr
            .as_deref()
            .map(ec_model::expr::parse)
            .transpose()?,
        condition: def.condition_expr.as_deref().map(ec_model::expr::parse).transpose()?,
    })
}

/// One period's result (`spec.md` §4.I step 5).
#[derive(Debug, Clone)]
pub struct PeriodResult {
    pub period_index: usize,
    pub power_mw: f64,
    pub fuel_sm3_per_day: f64,
    pub status: EvaluationStatus,
    pub detail: Option<OperatingResult>,
}

impl PeriodResult {
    fn zero(period_index: usize, status: EvaluationStatus) -> Self {
        Self {
            period_index,
            power_mw: 0.0,
            fuel_sm3_per_day: 0.0,
            status,
            detail: None,
        }
    }
}

/// Run every period of `program` against `built`. Periods evaluate
/// independently and may run in parallel (`spec.md` §5 "parallel across
/// periods is permitted"); `cancellation` is polled once per period and,
/// once observed, periods at or after the first period that saw it are
/// dropped from the returned prefix even if they had already completed
/// out of order — the result is always the *ordered* completed prefix.
pub fn run_time_series(
    program: &InstallationProgram,
    built: &BuiltTrain,
    turbine: Option<&TurbineCurve>,
    ctx: &(dyn ExprContext + Sync),
    total_periods: usize,
    detailed_output: bool,
    cancellation: &CancellationToken,
    progress: Option<&dyn ProgressSink>,
) -> DriverResult<Vec<PeriodResult>> {
    let cancelled_at = AtomicUsize::new(usize::MAX);

    let mut slots: Vec<Option<PeriodResult>> = (0..total_periods)
        .into_par_iter()
        .map(|period_index| {
            if cancellation.is_cancelled() {
                cancelled_at.fetch_min(period_index, Ordering::SeqCst);
                return None;
            }
            let result = evaluate_period(program, built, turbine, ctx, period_index, detailed_output);
            if let Some(sink) = progress {
                sink.on_period_complete(ProgressEvent { period_index, total_periods });
            }
            Some(result)
        })
        .collect();

    let cutoff = cancelled_at.load(Ordering::SeqCst);
    if cutoff != usize::MAX {
        slots.truncate(cutoff);
    }
    let results: Vec<PeriodResult> = slots.into_iter().flatten().collect();

    if cutoff != usize::MAX {
        return Err(DriverError::Cancelled {
            completed_periods: results.len(),
            total_periods,
        });
    }
    Ok(results)
}

fn evaluate_period(
    program: &InstallationProgram,
    built: &BuiltTrain,
    turbine: Option<&TurbineCurve>,
    ctx: &(dyn ExprContext + Sync),
    period_index: usize,
    detailed_output: bool,
) -> PeriodResult {
    let condition = match &program.condition {
        Some(node) => ec_model::expr::eval(node, ctx, period_index).unwrap_or(0.0),
        None => 1.0,
    };
    if condition == 0.0 {
        return PeriodResult::zero(period_index, EvaluationStatus::ConditionFalse);
    }

    let rate_sm3_per_day = match ec_model::expr::eval(&program.rate_sm3_per_day, ctx, period_index) {
        Ok(v) => v,
        Err(_) => return PeriodResult::zero(period_index, EvaluationStatus::Infeasible),
    };
    let suction_bar = match ec_model::expr::eval(&program.suction_pressure_bar, ctx, period_index) {
        Ok(v) => v,
        Err(_) => return PeriodResult::zero(period_index, EvaluationStatus::Infeasible),
    };
    let discharge_bar = match ec_model::expr::eval(&program.discharge_pressure_bar, ctx, period_index) {
        Ok(v) => v,
        Err(_) => return PeriodResult::zero(period_index, EvaluationStatus::Infeasible),
    };
    let interstage_bar = match &program.interstage_pressure_bar {
        Some(node) => match ec_model::expr::eval(node, ctx, period_index) {
            Ok(v) => Some(v),
            Err(_) => return PeriodResult::zero(period_index, EvaluationStatus::Infeasible),
        },
        None => None,
    };

    let mass_flow_kg_s =
        match sm3_per_day_to_kg_per_s(&built.fluid_model, &built.composition, rate_sm3_per_day) {
            Ok(v) => v,
            Err(_) => return PeriodResult::zero(period_index, EvaluationStatus::Infeasible),
        };

    let request = OperatingRequest {
        mass_flow_kg_s,
        suction_pressure: bar(suction_bar),
        discharge_pressure_target: bar(discharge_bar),
        interstage_pressure_target: interstage_bar.map(bar),
        inlet_composition: built.composition.clone(),
    };

    let solved = match &built.solve_strategy {
        TrainSolveStrategy::Common => built.train.solve(&built.fluid_model, &request),
        TrainSolveStrategy::Simplified { n_min, n_max } => ec_train::solve_simplified(
            built.train.stages(),
            &built.fluid_model,
            built.train.shaft(),
            &request,
            *n_min,
            *n_max,
        ),
        TrainSolveStrategy::Interstage { front, back } => match interstage_bar {
            Some(interstage_bar) => ec_train::solve_interstage(
                front,
                back,
                &built.fluid_model,
                &request,
                interstage_bar,
                built.train.maximum_power_mw(),
            ),
            None => return PeriodResult::zero(period_index, EvaluationStatus::Infeasible),
        },
    };

    match solved {
        Ok(result) => {
            let fuel_sm3_per_day = turbine
                .map(|t| t.fuel_rate_sm3_per_day(result.total_shaft_power_mw).unwrap_or(0.0))
                .unwrap_or(0.0);
            PeriodResult {
                period_index,
                power_mw: result.total_shaft_power_mw,
                fuel_sm3_per_day,
                status: result.status,
                detail: if detailed_output { Some(result) } else { None },
            }
        }
        Err(err) => PeriodResult::zero(period_index, status_for_error(&err)),
    }
}

fn status_for_error(err: &TrainError) -> EvaluationStatus {
    match err {
        TrainError::Infeasible { .. } => EvaluationStatus::Infeasible,
        TrainError::DidNotConverge { .. } => EvaluationStatus::DidNotConverge,
        TrainError::PowerLimitExceeded { .. } => EvaluationStatus::PowerLimitExceeded,
        TrainError::Stage(ec_stage::StageError::SpeedOutOfEnvelope { above, .. }) => {
            if *above {
                EvaluationStatus::Infeasible
            } else {
                EvaluationStatus::BelowMinSpeed
            }
        }
        TrainError::Turbine(ec_turbine::TurbineError::LoadOutOfRange { .. }) => {
            EvaluationStatus::TurbineLoadOutOfRange
        }
        _ => EvaluationStatus::Infeasible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_train;
    use ec_model::{
        ChartCurveDef, ChartDef, CompositionDef, ControlMarginDef, EfficiencyUnitDef, EosTagDef,
        FuelTypeDef, HeadUnitDef, InstallationDef, PressureControlPolicyDef, StageDef,
        TrainModelDef, TrainTypeDef,
    };
    use std::collections::HashMap;

    struct FixedSeries(HashMap<(String, String), Vec<f64>>);

    impl ExprContext for FixedSeries {
        fn time_series(&self, series: &str, column: &str, period: usize) -> Option<f64> {
            self.0.get(&(series.to_string(), column.to_string())).and_then(|v| v.get(period)).copied()
        }
        fn variable(&self, _name: &str) -> Option<f64> {
            None
        }
    }

    fn train_def() -> TrainModelDef {
        let curve = ChartCurveDef {
            speed_rpm: 7_500.0,
            flow_am3_per_hour: vec![3_000.0, 4_000.0, 5_000.0],
            head: vec![8_500.0, 7_500.0, 6_500.0],
            head_unit: HeadUnitDef::JPerKg,
            efficiency: vec![0.72, 0.74, 0.70],
            efficiency_unit: EfficiencyUnitDef::Fraction,
        };
        TrainModelDef {
            name: "train-a".to_string(),
            eos: EosTagDef::Srk,
            composition: CompositionDef::Pure { species: "methane".to_string() },
            train_type: TrainTypeDef::SingleSpeed,
            policy: PressureControlPolicyDef::DownstreamChoke,
            stages: vec![StageDef {
                inlet_temperature_c: 30.0,
                chart: ChartDef::SingleSpeed { curve, control_margin: ControlMarginDef::default() },
                pressure_drop_ahead_of_stage_bar: None,
                interstage_control_pressure_bar: None,
            }],
            maximum_pressure_ratio_per_stage: None,
            maximum_power_mw: None,
            maximum_discharge_pressure_bar: None,
            mechanical_efficiency: Some(0.98),
            power_adjustment_factor: None,
            power_adjustment_constant_mw: None,
            fuel_type: Some("fuel-gas".to_string()),
            calculate_max_rate: false,
        }
    }

    fn installation_def() -> InstallationDef {
        InstallationDef {
            name: "install-a".to_string(),
            model: "train-a".to_string(),
            rate_expr: "SIM;GAS_RATE".to_string(),
            suction_pressure_expr: "20.0".to_string(),
            discharge_pressure_expr: "80.0".to_string(),
            interstage_pressure_expr: None,
            condition_expr: Some("SIM;WATER_PROD > 1500".to_string()),
        }
    }

    fn fuel_type() -> FuelTypeDef {
        FuelTypeDef {
            name: "fuel-gas".to_string(),
            lhv_mj_per_sm3: 38.0,
            loads_mw: vec![0.0, 10.0, 20.0],
            efficiencies: vec![0.0, 0.30, 0.36],
        }
    }

    #[test]
    fn scenario_s5_condition_masks_period() {
        let built = build_train(&train_def(), &[]).unwrap();
        let program = compile_installation(&installation_def()).unwrap();
        let fuel = fuel_type();
        let turbine = TurbineCurve::new(fuel.loads_mw, fuel.efficiencies, fuel.lhv_mj_per_sm3).unwrap();

        let mut series = HashMap::new();
        series.insert(("SIM".to_string(), "GAS_RATE".to_string()), vec![2.0e6, 2.0e6]);
        series.insert(("SIM".to_string(), "WATER_PROD".to_string()), vec![1_000.0, 2_000.0]);
        let ctx = FixedSeries(series);

        let token = CancellationToken::new();
        let results =
            run_time_series(&program, &built, Some(&turbine), &ctx, 2, false, &token, None).unwrap();

        assert_eq!(results[0].status, EvaluationStatus::ConditionFalse);
        assert_eq!(results[0].power_mw, 0.0);
        assert_eq!(results[0].fuel_sm3_per_day, 0.0);

        assert_eq!(results[1].status, EvaluationStatus::Ok);
        assert!(results[1].power_mw > 0.0);
        assert!(results[1].fuel_sm3_per_day > 0.0);
    }

    #[test]
    fn cancellation_truncates_to_a_prefix() {
        let built = build_train(&train_def(), &[]).unwrap();
        let program = compile_installation(&installation_def()).unwrap();

        let mut series = HashMap::new();
        series.insert(("SIM".to_string(), "GAS_RATE".to_string()), vec![2.0e6; 10]);
        series.insert(("SIM".to_string(), "WATER_PROD".to_string()), vec![2_000.0; 10]);
        let ctx = FixedSeries(series);

        let token = CancellationToken::new();
        token.cancel();
        let err = run_time_series(&program, &built, None, &ctx, 10, false, &token, None).unwrap_err();
        assert!(matches!(err, DriverError::Cancelled { completed_periods: 0, total_periods: 10 }));
    }

    fn variable_speed_curve(speed_rpm: f64, head_scale: f64) -> ChartCurveDef {
        ChartCurveDef {
            speed_rpm,
            flow_am3_per_hour: vec![3_000.0, 4_000.0, 5_000.0],
            head: vec![8_500.0 * head_scale, 7_500.0 * head_scale, 6_500.0 * head_scale],
            head_unit: HeadUnitDef::JPerKg,
            efficiency: vec![0.72, 0.74, 0.70],
            efficiency_unit: EfficiencyUnitDef::Fraction,
        }
    }

    #[test]
    fn simplified_variable_speed_train_evaluates_through_solve_simplified() {
        let chart = ChartDef::VariableSpeed {
            curves: vec![variable_speed_curve(8_000.0, 1.0), variable_speed_curve(12_000.0, 1.5)],
            control_margin: ControlMarginDef::default(),
        };
        let mut def = train_def();
        def.train_type = TrainTypeDef::SimplifiedVariableSpeed;
        def.stages = vec![
            StageDef {
                inlet_temperature_c: 30.0,
                chart: chart.clone(),
                pressure_drop_ahead_of_stage_bar: None,
                interstage_control_pressure_bar: None,
            },
            StageDef {
                inlet_temperature_c: 30.0,
                chart,
                pressure_drop_ahead_of_stage_bar: None,
                interstage_control_pressure_bar: None,
            },
        ];

        let built = build_train(&def, &[]).unwrap();
        let mut installation = installation_def();
        installation.discharge_pressure_expr = "120.0".to_string();
        installation.condition_expr = None;
        let program = compile_installation(&installation).unwrap();

        let mut series = HashMap::new();
        series.insert(("SIM".to_string(), "GAS_RATE".to_string()), vec![4.0e6]);
        let ctx = FixedSeries(series);

        let token = CancellationToken::new();
        let results = run_time_series(&program, &built, None, &ctx, 1, true, &token, None).unwrap();

        assert_eq!(results[0].status, EvaluationStatus::Ok);
        let detail = results[0].detail.as_ref().unwrap();
        assert_eq!(detail.stage_reports.len(), 2);
    }

    #[test]
    fn multi_stream_train_evaluates_through_solve_interstage() {
        let mut def = train_def();
        def.train_type = TrainTypeDef::VariableSpeedMultiStream;
        def.policy = PressureControlPolicyDef::DownstreamChoke;
        def.stages = vec![
            train_def().stages[0].clone(),
            StageDef {
                interstage_control_pressure_bar: Some(50.0),
                ..train_def().stages[0].clone()
            },
            train_def().stages[0].clone(),
        ];

        let built = build_train(&def, &[]).unwrap();
        let mut installation = installation_def();
        installation.discharge_pressure_expr = "80.0".to_string();
        installation.interstage_pressure_expr = Some("50.0".to_string());
        installation.condition_expr = None;
        let program = compile_installation(&installation).unwrap();

        let mut series = HashMap::new();
        series.insert(("SIM".to_string(), "GAS_RATE".to_string()), vec![2.0e6]);
        let ctx = FixedSeries(series);

        let token = CancellationToken::new();
        let results = run_time_series(&program, &built, None, &ctx, 1, true, &token, None).unwrap();

        assert_eq!(results[0].status, EvaluationStatus::Ok);
        let detail = results[0].detail.as_ref().unwrap();
        assert_eq!(detail.stage_reports.len(), 3);
        assert!((detail.discharge_pressure_bar - 80.0).abs() < 1e-3);
    }
}
