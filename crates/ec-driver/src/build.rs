//! Construct runtime `ec_train::Train` / `ec_fluid::FluidModel` /
//! `ec_turbine` objects from a parsed `ec_model::EcalcModel` (`spec.md` §7
//! `ModelInvalid`: "raised during construction").

use std::str::FromStr;

use ec_chart::{ChartCurve, CompressorChart, ControlMargin, canonical_shape, realize_generic_chart};
use ec_core::units::{Pressure, Temperature, bar, celsius, head_kj_per_kg_to_j_per_kg, head_m_to_j_per_kg};
use ec_fluid::{Composition, CubicFluidModel, EosKind, FluidModel, FluidState, Species};
use ec_model::{
    ChartCurveDef, ChartDef, CompositionDef, EfficiencyUnitDef, EosTagDef, HeadUnitDef,
    PressureControlPolicyDef, StageDef, TrainModelDef, TrainTypeDef,
};
use ec_stage::Stage;
use ec_train::{PressureControlPolicy, SpeedMode, Train};
use ec_turbine::ShaftConfig;

use crate::error::{DriverError, DriverResult};

/// Which of `ec_train`'s three solve paths a built train dispatches to
/// (`spec.md` §4.E): a `VariableSpeed`/`SingleSpeed` train is solved
/// whole by `Train::solve`'s common-speed root-find; a
/// `SimplifiedVariableSpeed` train is solved stage-by-stage by
/// `ec_train::solve_simplified`; a `VariableSpeedMultiStream` train with
/// an interstage-control stage is split into front/back subtrains solved
/// by `ec_train::solve_interstage`.
pub enum TrainSolveStrategy {
    Common,
    Simplified { n_min: f64, n_max: f64 },
    Interstage { front: Box<Train>, back: Box<Train> },
}

/// A built train plus the fluid model and composition it was constructed
/// against, and an optional turbine for fuel-rate reporting. `train` is
/// always the whole stage chain (for introspection, e.g. `stages().len()`
/// and single/common-speed solving); `solve_strategy` says which of
/// `ec_train`'s solve paths actually evaluates it.
pub struct BuiltTrain {
    pub name: String,
    pub train: Train,
    pub solve_strategy: TrainSolveStrategy,
    pub fluid_model: CubicFluidModel,
    pub composition: Composition,
}

/// Supplies the one-time design point a `GENERIC_FROM_INPUT` stage chart
/// needs at construction (`ec_chart::generic`'s doc note: the design point
/// must be resolved by the caller, not lazily on first use, to avoid a race
/// under parallel period evaluation). Keyed by stage index within the
/// train. Stages using any other chart type ignore this.
#[derive(Debug, Clone, Copy)]
pub struct StageDesignHint {
    pub stage_index: usize,
    pub inlet_pressure: Pressure,
    pub target_outlet_pressure: Pressure,
    pub nominal_mass_flow_kg_s: f64,
}

pub fn build_train(
    def: &TrainModelDef,
    design_hints: &[StageDesignHint],
) -> DriverResult<BuiltTrain> {
    let composition = build_composition(&def.composition)?;
    let eos = build_eos(def.eos);
    let fluid_model = CubicFluidModel::new(def.name.clone(), eos);

    let interstage_positions: Vec<usize> = def
        .stages
        .iter()
        .enumerate()
        .filter(|(_, s)| s.interstage_control_pressure_bar.is_some())
        .map(|(i, _)| i)
        .collect();
    if interstage_positions.len() > 1 {
        return Err(DriverError::ModelInvalid {
            what: "multiple interstage-control stages in one train".to_string(),
        });
    }
    if def.stages[0].interstage_control_pressure_bar.is_some() {
        return Err(DriverError::ModelInvalid {
            what: "interstage control is not permitted on the first stage".to_string(),
        });
    }
    match (def.train_type, interstage_positions.first()) {
        (TrainTypeDef::VariableSpeedMultiStream, None) => {
            return Err(DriverError::ModelInvalid {
                what: "VARIABLE_SPEED_MULTI_STREAM train requires exactly one stage declaring \
                       INTERSTAGE_CONTROL_PRESSURE_BAR"
                    .to_string(),
            });
        }
        (TrainTypeDef::VariableSpeedMultiStream, Some(_)) => {}
        (_, None) => {}
        (_, Some(_)) => {
            return Err(DriverError::ModelInvalid {
                what: "INTERSTAGE_CONTROL_PRESSURE_BAR is only permitted on a \
                       VARIABLE_SPEED_MULTI_STREAM train"
                    .to_string(),
            });
        }
    }

    let mut stages = Vec::with_capacity(def.stages.len());
    for (stage_index, stage_def) in def.stages.iter().enumerate() {
        let hint = design_hints.iter().find(|h| h.stage_index == stage_index);
        let chart = build_chart(&stage_def.chart, &fluid_model, &composition, hint)?;
        let pressure_drop_ahead = stage_def.pressure_drop_ahead_of_stage_bar.map(bar);
        let stage = Stage::new(celsius(stage_def.inlet_temperature_c), chart, pressure_drop_ahead)?;
        stages.push(stage);
    }

    let mech_efficiency = def.mechanical_efficiency.unwrap_or(1.0);
    let shaft = match (def.power_adjustment_factor, def.power_adjustment_constant_mw) {
        (Some(factor), constant) => {
            ShaftConfig::from_power_adjustment(factor, constant.unwrap_or(0.0))?
        }
        (None, Some(constant)) => ShaftConfig::with_adjustment_constant(mech_efficiency, constant)?,
        (None, None) => ShaftConfig::new(mech_efficiency)?,
    };

    let policy = build_policy(def.policy);
    let speed_mode = build_speed_mode(def.train_type, def);

    let train = Train::new(
        stages.clone(),
        policy,
        speed_mode,
        shaft,
        def.maximum_power_mw,
        def.maximum_discharge_pressure_bar,
    )?;

    let solve_strategy = match def.train_type {
        TrainTypeDef::SingleSpeed | TrainTypeDef::VariableSpeed => TrainSolveStrategy::Common,
        TrainTypeDef::SimplifiedVariableSpeed => {
            let (n_min, n_max) = speed_envelope_from_charts(def);
            TrainSolveStrategy::Simplified { n_min, n_max }
        }
        TrainTypeDef::VariableSpeedMultiStream => {
            let split_index = interstage_positions[0];
            let (n_min, n_max) = speed_envelope_from_charts(def);
            let front = Train::new(
                stages[..=split_index].to_vec(),
                PressureControlPolicy::UpstreamChoke,
                SpeedMode::Variable { n_min, n_max },
                shaft,
                None,
                None,
            )?;
            let back = Train::new(
                stages[split_index + 1..].to_vec(),
                PressureControlPolicy::DownstreamChoke,
                SpeedMode::Variable { n_min, n_max },
                shaft,
                None,
                def.maximum_discharge_pressure_bar,
            )?;
            TrainSolveStrategy::Interstage { front: Box::new(front), back: Box::new(back) }
        }
    };

    Ok(BuiltTrain {
        name: def.name.clone(),
        train,
        solve_strategy,
        fluid_model,
        composition,
    })
}

/// Expand a `SimplifiedVariableSpeed` train's single stage definition into
/// `N` identical stages when `STAGES` holds exactly one template stage and
/// `MAXIMUM_PRESSURE_RATIO_PER_STAGE` is set (`spec.md` §4.E: `N =
/// ⌈log(P_d/P_s)/log(MAX_RATIO)⌉`). Must be called with the first
/// evaluation's suction/discharge pressures before `build_train`, since N
/// is fixed once and reused for the rest of a time series. A no-op clone
/// for every other train shape.
pub fn resolve_simplified_train_sizing(
    def: &TrainModelDef,
    suction_bar: f64,
    discharge_bar: f64,
) -> DriverResult<TrainModelDef> {
    let applies = def.train_type == TrainTypeDef::SimplifiedVariableSpeed
        && def.stages.len() == 1
        && def.maximum_pressure_ratio_per_stage.is_some();
    if !applies {
        return Ok(def.clone());
    }

    let max_ratio = def.maximum_pressure_ratio_per_stage.unwrap();
    if max_ratio <= 1.0 {
        return Err(DriverError::ModelInvalid {
            what: "MAXIMUM_PRESSURE_RATIO_PER_STAGE must be greater than 1".to_string(),
        });
    }
    let n = ((discharge_bar / suction_bar).ln() / max_ratio.ln()).ceil().max(1.0) as usize;

    let mut sized = def.clone();
    sized.stages = std::iter::repeat(def.stages[0].clone()).take(n).collect();
    Ok(sized)
}

fn build_composition(def: &CompositionDef) -> DriverResult<Composition> {
    match def {
        CompositionDef::Pure { species } => {
            let species = Species::from_str(species).map_err(|_| DriverError::ModelInvalid {
                what: format!("unknown species '{species}'"),
            })?;
            Composition::new_mole_fractions(vec![(species, 1.0)]).map_err(DriverError::from)
        }
        CompositionDef::Mixture { fractions } => {
            let mut parsed = Vec::with_capacity(fractions.len());
            for (name, fraction) in fractions {
                let species = Species::from_str(name).map_err(|_| DriverError::ModelInvalid {
                    what: format!("unknown species '{name}'"),
                })?;
                parsed.push((species, *fraction));
            }
            Composition::new_mole_fractions(parsed).map_err(DriverError::from)
        }
    }
}

fn build_eos(tag: EosTagDef) -> EosKind {
    match tag {
        EosTagDef::Srk | EosTagDef::GergSrk => EosKind::Srk,
        EosTagDef::Pr | EosTagDef::GergPr => EosKind::Pr,
    }
}

fn build_policy(def: PressureControlPolicyDef) -> PressureControlPolicy {
    match def {
        PressureControlPolicyDef::DownstreamChoke => PressureControlPolicy::DownstreamChoke,
        PressureControlPolicyDef::UpstreamChoke => PressureControlPolicy::UpstreamChoke,
        PressureControlPolicyDef::IndividualAsvPressure => PressureControlPolicy::IndividualAsvPressure,
        PressureControlPolicyDef::IndividualAsvRate => PressureControlPolicy::IndividualAsvRate,
        PressureControlPolicyDef::CommonAsv => PressureControlPolicy::CommonAsv,
    }
}

fn build_speed_mode(train_type: TrainTypeDef, def: &TrainModelDef) -> SpeedMode {
    match train_type {
        TrainTypeDef::SingleSpeed => SpeedMode::Fixed(def_single_speed_rpm(def)),
        TrainTypeDef::VariableSpeed | TrainTypeDef::SimplifiedVariableSpeed | TrainTypeDef::VariableSpeedMultiStream => {
            let (n_min, n_max) = speed_envelope_from_charts(def);
            SpeedMode::Variable { n_min, n_max }
        }
    }
}

fn def_single_speed_rpm(def: &TrainModelDef) -> f64 {
    match &def.stages[0].chart {
        ChartDef::SingleSpeed { curve, .. } => curve.speed_rpm,
        ChartDef::VariableSpeed { curves, .. } => curves[0].speed_rpm,
        ChartDef::GenericFromDesignPoint { .. } | ChartDef::GenericFromInput { .. } => {
            ec_chart::generic::NOMINAL_DESIGN_SPEED_RPM
        }
    }
}

fn speed_envelope_from_charts(def: &TrainModelDef) -> (f64, f64) {
    let speeds: Vec<f64> = match &def.stages[0].chart {
        ChartDef::VariableSpeed { curves, .. } => curves.iter().map(|c| c.speed_rpm).collect(),
        _ => ec_chart::generic::RELATIVE_SPEEDS
            .iter()
            .map(|s| s * ec_chart::generic::NOMINAL_DESIGN_SPEED_RPM)
            .collect(),
    };
    (
        speeds.iter().cloned().fold(f64::INFINITY, f64::min),
        speeds.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    )
}

fn build_chart(
    def: &ChartDef,
    fluid_model: &CubicFluidModel,
    composition: &Composition,
    hint: Option<&StageDesignHint>,
) -> DriverResult<CompressorChart> {
    match def {
        ChartDef::SingleSpeed { curve, control_margin } => {
            let margin = build_margin(control_margin.fraction, control_margin.percentage)?;
            let curve = build_curve(curve)?;
            Ok(CompressorChart::single_speed(curve, margin))
        }
        ChartDef::VariableSpeed { curves, control_margin } => {
            let margin = build_margin(control_margin.fraction, control_margin.percentage)?;
            let curves = curves.iter().map(build_curve).collect::<DriverResult<Vec<_>>>()?;
            Ok(CompressorChart::variable_speed(curves, margin)?)
        }
        ChartDef::GenericFromDesignPoint {
            efficiency,
            design_flow_am3_per_hour,
            design_head_j_per_kg,
            control_margin,
        } => {
            let margin = build_margin(control_margin.fraction, control_margin.percentage)?;
            Ok(realize_generic_chart(
                &canonical_shape(),
                *efficiency,
                *design_flow_am3_per_hour,
                *design_head_j_per_kg,
                margin,
            )?)
        }
        ChartDef::GenericFromInput { efficiency, control_margin } => {
            let hint = hint.ok_or_else(|| DriverError::ModelInvalid {
                what: "GENERIC_FROM_INPUT chart requires a stage design hint".to_string(),
            })?;
            let margin = build_margin(control_margin.fraction, control_margin.percentage)?;
            let (q_design, h_design) =
                resolve_generic_from_input_design_point(*efficiency, fluid_model, composition, hint)?;
            Ok(realize_generic_chart(&canonical_shape(), *efficiency, q_design, h_design, margin)?)
        }
    }
}

fn build_margin(fraction: f64, percentage: Option<f64>) -> DriverResult<ControlMargin> {
    match percentage {
        Some(pct) => Ok(ControlMargin::from_percentage(pct)?),
        None => Ok(ControlMargin::from_fraction(fraction)?),
    }
}

fn build_curve(def: &ChartCurveDef) -> DriverResult<ChartCurve> {
    let head_j_per_kg: Vec<f64> = def
        .head
        .iter()
        .map(|h| match def.head_unit {
            HeadUnitDef::JPerKg => *h,
            HeadUnitDef::KjPerKg => head_kj_per_kg_to_j_per_kg(*h),
            HeadUnitDef::Meter => head_m_to_j_per_kg(*h),
        })
        .collect();
    let efficiency: Vec<f64> = def
        .efficiency
        .iter()
        .map(|e| match def.efficiency_unit {
            EfficiencyUnitDef::Fraction => *e,
            EfficiencyUnitDef::Percentage => *e / 100.0,
        })
        .collect();
    Ok(ChartCurve::new(def.speed_rpm, def.flow_am3_per_hour.clone(), head_j_per_kg, efficiency)?)
}

/// Derive the one-time `(Q_design, H_design)` point a `GENERIC_FROM_INPUT`
/// chart is realized at, from the stage's assigned nominal operating point
/// and a fixed polytropic efficiency, using the same polytropic relation
/// `ec_stage::evaluate` applies (`spec.md` §4.C steps 3-4).
fn resolve_generic_from_input_design_point(
    efficiency: f64,
    fluid_model: &CubicFluidModel,
    composition: &Composition,
    hint: &StageDesignHint,
) -> DriverResult<(f64, f64)> {
    let t1 = celsius(30.0);
    let inlet_state = fluid_model.state(hint.inlet_pressure, t1, composition.clone())?;
    let kappa = inlet_state.kappa();
    let z1 = inlet_state.z_factor();
    let specific_gas_constant = ec_core::units::constants::R_GAS_J_PER_MOL_K * 1000.0 / inlet_state.molar_mass();

    let exponent_ratio = (kappa - 1.0) / (kappa * efficiency);
    let pressure_ratio = hint.target_outlet_pressure.value / hint.inlet_pressure.value;
    let r_pow = pressure_ratio.powf(exponent_ratio);
    let h_design = (r_pow - 1.0) * z1 * specific_gas_constant * t1.value / exponent_ratio;

    let q_design_am3_per_hour = hint.nominal_mass_flow_kg_s / inlet_state.density().value * 3600.0;
    Ok((q_design_am3_per_hour, h_design))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_model::{ChartCurveDef, ControlMarginDef, StageDef};

    fn single_speed_train_def() -> TrainModelDef {
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
            fuel_type: None,
            calculate_max_rate: false,
        }
    }

    #[test]
    fn builds_a_single_speed_train() {
        let def = single_speed_train_def();
        let built = build_train(&def, &[]).unwrap();
        assert_eq!(built.train.stages().len(), 1);
    }

    #[test]
    fn rejects_interstage_control_on_first_stage() {
        let mut def = single_speed_train_def();
        def.stages[0].interstage_control_pressure_bar = Some(50.0);
        let err = build_train(&def, &[]).unwrap_err();
        assert!(matches!(err, DriverError::ModelInvalid { .. }));
    }

    #[test]
    fn rejects_unknown_species() {
        let mut def = single_speed_train_def();
        def.composition = CompositionDef::Pure { species: "unobtainium".to_string() };
        assert!(build_train(&def, &[]).is_err());
    }

    #[test]
    fn rejects_maximum_discharge_pressure_without_downstream_choke() {
        let mut def = single_speed_train_def();
        def.policy = PressureControlPolicyDef::UpstreamChoke;
        def.maximum_discharge_pressure_bar = Some(100.0);
        assert!(build_train(&def, &[]).is_err());
    }

    fn two_stage_def(train_type: TrainTypeDef) -> TrainModelDef {
        let mut def = single_speed_train_def();
        def.train_type = train_type;
        def.stages.push(def.stages[0].clone());
        def
    }

    fn three_stage_def(train_type: TrainTypeDef) -> TrainModelDef {
        let mut def = single_speed_train_def();
        def.train_type = train_type;
        def.stages.push(def.stages[0].clone());
        def.stages.push(def.stages[0].clone());
        def
    }

    #[test]
    fn simplified_variable_speed_dispatches_to_simplified_strategy() {
        let def = two_stage_def(TrainTypeDef::SimplifiedVariableSpeed);
        let built = build_train(&def, &[]).unwrap();
        assert!(matches!(built.solve_strategy, TrainSolveStrategy::Simplified { .. }));
    }

    #[test]
    fn variable_speed_multi_stream_builds_front_and_back_subtrains() {
        let mut def = three_stage_def(TrainTypeDef::VariableSpeedMultiStream);
        def.stages[1].interstage_control_pressure_bar = Some(50.0);
        let built = build_train(&def, &[]).unwrap();
        match built.solve_strategy {
            TrainSolveStrategy::Interstage { front, back } => {
                assert_eq!(front.stages().len(), 2);
                assert_eq!(back.stages().len(), 1);
            }
            _ => panic!("expected Interstage strategy"),
        }
    }

    #[test]
    fn rejects_multi_stream_train_with_no_interstage_stage() {
        let def = two_stage_def(TrainTypeDef::VariableSpeedMultiStream);
        let err = build_train(&def, &[]).unwrap_err();
        assert!(matches!(err, DriverError::ModelInvalid { .. }));
    }

    #[test]
    fn rejects_interstage_control_on_a_non_multi_stream_train() {
        let mut def = two_stage_def(TrainTypeDef::SingleSpeed);
        def.stages[1].interstage_control_pressure_bar = Some(50.0);
        let err = build_train(&def, &[]).unwrap_err();
        assert!(matches!(err, DriverError::ModelInvalid { .. }));
    }

    #[test]
    fn resolve_simplified_train_sizing_computes_stage_count_from_ratio() {
        let mut def = single_speed_train_def();
        def.train_type = TrainTypeDef::SimplifiedVariableSpeed;
        def.maximum_pressure_ratio_per_stage = Some(2.0);
        // P_d/P_s = 120/20 = 6, ceil(ln6/ln2) = ceil(2.58) = 3 stages.
        let sized = resolve_simplified_train_sizing(&def, 20.0, 120.0).unwrap();
        assert_eq!(sized.stages.len(), 3);
    }

    #[test]
    fn resolve_simplified_train_sizing_is_a_no_op_when_stages_are_already_given() {
        let def = two_stage_def(TrainTypeDef::SimplifiedVariableSpeed);
        let sized = resolve_simplified_train_sizing(&def, 20.0, 120.0).unwrap();
        assert_eq!(sized.stages.len(), 2);
    }
}
