//! Model input schema (`spec.md` §6: "Keys are case-sensitive uppercase").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EcalcModel {
    #[serde(rename = "FUEL_TYPES", default)]
    pub fuel_types: Vec<FuelTypeDef>,
    #[serde(rename = "MODELS", default)]
    pub models: Vec<TrainModelDef>,
    #[serde(rename = "INSTALLATIONS", default)]
    pub installations: Vec<InstallationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelTypeDef {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "LHV_MJ_PER_SM3")]
    pub lhv_mj_per_sm3: f64,
    #[serde(rename = "LOADS_MW")]
    pub loads_mw: Vec<f64>,
    #[serde(rename = "EFFICIENCIES")]
    pub efficiencies: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "TYPE")]
pub enum CompositionDef {
    #[serde(rename = "PURE")]
    Pure { species: String },
    #[serde(rename = "MIXTURE")]
    Mixture { fractions: Vec<(String, f64)> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EosTagDef {
    Srk,
    Pr,
    GergSrk,
    GergPr,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartCurveDef {
    #[serde(rename = "SPEED_RPM")]
    pub speed_rpm: f64,
    #[serde(rename = "FLOW_AM3_PER_HOUR")]
    pub flow_am3_per_hour: Vec<f64>,
    #[serde(rename = "HEAD")]
    pub head: Vec<f64>,
    #[serde(rename = "HEAD_UNIT", default)]
    pub head_unit: HeadUnitDef,
    #[serde(rename = "EFFICIENCY")]
    pub efficiency: Vec<f64>,
    #[serde(rename = "EFFICIENCY_UNIT", default)]
    pub efficiency_unit: EfficiencyUnitDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HeadUnitDef {
    #[default]
    JPerKg,
    KjPerKg,
    Meter,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EfficiencyUnitDef {
    #[default]
    Fraction,
    Percentage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "TYPE")]
pub enum ChartDef {
    #[serde(rename = "SINGLE_SPEED")]
    SingleSpeed {
        curve: ChartCurveDef,
        #[serde(rename = "CONTROL_MARGIN", default)]
        control_margin: ControlMarginDef,
    },
    #[serde(rename = "VARIABLE_SPEED")]
    VariableSpeed {
        curves: Vec<ChartCurveDef>,
        #[serde(rename = "CONTROL_MARGIN", default)]
        control_margin: ControlMarginDef,
    },
    #[serde(rename = "GENERIC_FROM_DESIGN_POINT")]
    GenericFromDesignPoint {
        efficiency: f64,
        #[serde(rename = "DESIGN_FLOW_AM3_PER_HOUR")]
        design_flow_am3_per_hour: f64,
        #[serde(rename = "DESIGN_HEAD_J_PER_KG")]
        design_head_j_per_kg: f64,
        #[serde(rename = "CONTROL_MARGIN", default)]
        control_margin: ControlMarginDef,
    },
    #[serde(rename = "GENERIC_FROM_INPUT")]
    GenericFromInput {
        efficiency: f64,
        #[serde(rename = "CONTROL_MARGIN", default)]
        control_margin: ControlMarginDef,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ControlMarginDef {
    #[serde(default)]
    pub fraction: f64,
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDef {
    #[serde(rename = "INLET_TEMPERATURE_C")]
    pub inlet_temperature_c: f64,
    #[serde(rename = "CHART")]
    pub chart: ChartDef,
    #[serde(rename = "PRESSURE_DROP_AHEAD_OF_STAGE_BAR", default)]
    pub pressure_drop_ahead_of_stage_bar: Option<f64>,
    #[serde(rename = "INTERSTAGE_CONTROL_PRESSURE_BAR", default)]
    pub interstage_control_pressure_bar: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PressureControlPolicyDef {
    DownstreamChoke,
    UpstreamChoke,
    IndividualAsvPressure,
    IndividualAsvRate,
    CommonAsv,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TrainTypeDef {
    #[default]
    SingleSpeed,
    VariableSpeed,
    SimplifiedVariableSpeed,
    VariableSpeedMultiStream,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainModelDef {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "EOS")]
    pub eos: EosTagDef,
    #[serde(rename = "COMPOSITION")]
    pub composition: CompositionDef,
    #[serde(rename = "TRAIN_TYPE", default)]
    pub train_type: TrainTypeDef,
    #[serde(rename = "POLICY")]
    pub policy: PressureControlPolicyDef,
    #[serde(rename = "STAGES")]
    pub stages: Vec<StageDef>,
    #[serde(rename = "MAXIMUM_PRESSURE_RATIO_PER_STAGE", default)]
    pub maximum_pressure_ratio_per_stage: Option<f64>,
    #[serde(rename = "MAXIMUM_POWER_MW", default)]
    pub maximum_power_mw: Option<f64>,
    #[serde(rename = "MAXIMUM_DISCHARGE_PRESSURE_BAR", default)]
    pub maximum_discharge_pressure_bar: Option<f64>,
    #[serde(rename = "MECHANICAL_EFFICIENCY", default)]
    pub mechanical_efficiency: Option<f64>,
    #[serde(rename = "POWER_ADJUSTMENT_FACTOR", default)]
    pub power_adjustment_factor: Option<f64>,
    #[serde(rename = "POWER_ADJUSTMENT_CONSTANT_MW", default)]
    pub power_adjustment_constant_mw: Option<f64>,
    #[serde(rename = "FUEL_TYPE", default)]
    pub fuel_type: Option<String>,
    #[serde(rename = "CALCULATE_MAX_RATE", default)]
    pub calculate_max_rate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallationDef {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "RATE_SM3_PER_DAY")]
    pub rate_expr: String,
    #[serde(rename = "SUCTION_PRESSURE_BAR")]
    pub suction_pressure_expr: String,
    #[serde(rename = "DISCHARGE_PRESSURE_BAR")]
    pub discharge_pressure_expr: String,
    #[serde(rename = "INTERSTAGE_PRESSURE_BAR", default)]
    pub interstage_pressure_expr: Option<String>,
    #[serde(rename = "CONDITION", default)]
    pub condition_expr: Option<String>,
}
