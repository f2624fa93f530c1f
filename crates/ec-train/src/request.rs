//! Operating request/result types (`spec.md` §3 Operating Request/Result).

use ec_core::units::Pressure;
use ec_fluid::Composition;
use ec_stage::StageOutput;

use crate::error::EvaluationStatus;

/// A single evaluation request against a train.
#[derive(Debug, Clone)]
pub struct OperatingRequest {
    pub mass_flow_kg_s: f64,
    pub suction_pressure: Pressure,
    pub discharge_pressure_target: Pressure,
    pub interstage_pressure_target: Option<Pressure>,
    pub inlet_composition: Composition,
}

/// One stage's contribution to a train solve.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage_index: usize,
    pub speed_rpm: f64,
    pub shaft_power_mw: f64,
    pub output: StageOutput,
}

/// The outcome of one train solve (`spec.md` §3 Operating Result, per-train
/// fields).
#[derive(Debug, Clone)]
pub struct OperatingResult {
    pub stage_reports: Vec<StageReport>,
    pub total_gas_power_mw: f64,
    pub total_shaft_power_mw: f64,
    pub discharge_pressure_bar: f64,
    /// Overall recycle fraction of mass flow relative to the requested net
    /// rate, for policies that add a train-wide recycle loop. Zero unless a
    /// recycle policy was applied.
    pub asv_recycle_fraction: f64,
    pub status: EvaluationStatus,
}
