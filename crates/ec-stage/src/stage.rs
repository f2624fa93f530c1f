//! Single-stage polytropic compression (`spec.md` §4.C).

use ec_chart::{ChartClassification, CompressorChart};
use ec_core::units::constants::R_GAS_J_PER_MOL_K;
use ec_core::units::{Pressure, Temperature, k, pa};
use ec_fluid::{Composition, FluidModel, FluidState};

use crate::error::{StageClassification, StageError, StageResult};

/// A single compression stage: a chart, a fixed (aftercooler) inlet
/// temperature, and an optional pressure drop applied ahead of the stage
/// (`spec.md` §4.C, step 6/7).
#[derive(Debug, Clone)]
pub struct Stage {
    inlet_temperature: Temperature,
    chart: CompressorChart,
    pressure_drop_ahead: Option<Pressure>,
}

impl Stage {
    pub fn new(
        inlet_temperature: Temperature,
        chart: CompressorChart,
        pressure_drop_ahead: Option<Pressure>,
    ) -> StageResult<Self> {
        if !inlet_temperature.value.is_finite() || inlet_temperature.value <= 0.0 {
            return Err(StageError::InvalidInletTemperature {
                value: inlet_temperature.value,
            });
        }
        Ok(Self {
            inlet_temperature,
            chart,
            pressure_drop_ahead,
        })
    }

    pub fn chart(&self) -> &CompressorChart {
        &self.chart
    }

    pub fn inlet_temperature(&self) -> Temperature {
        self.inlet_temperature
    }
}

/// Per-evaluation stage input: the upstream pressure (before any
/// `pressure_drop_ahead_of_stage`), composition, mass flow, and shaft speed.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub inlet_pressure: Pressure,
    pub composition: Composition,
    pub mass_flow_kg_s: f64,
    pub speed_rpm: f64,
}

/// Result of evaluating one stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub inlet_state: FluidState,
    pub outlet_state: FluidState,
    pub pressure_ratio: f64,
    pub polytropic_head_j_per_kg: f64,
    pub polytropic_efficiency: f64,
    pub gas_power_w: f64,
    pub classification: StageClassification,
    /// Fraction of the elevated (post-recycle) flow that is recycle, 0 if
    /// the stage is not anti-surge-recycling (`spec.md` §4.C ASV recycling).
    pub asv_recycle_fraction: f64,
}

/// Evaluate one stage per the `spec.md` §4.C algorithm:
///
/// 1. Apply `pressure_drop_ahead_of_stage` to the upstream pressure (inlet
///    choke), then apply inlet cooling: the stage inlet temperature is
///    always the stage's configured `T_in`, regardless of the previous
///    stage's outlet temperature (aftercooler assumption).
/// 2. Query the chart at (Q1, n) for polytropic head/efficiency, recycling
///    flow up to `Q_min_effective` if below surge.
/// 3. Derive the polytropic exponent from κ and η_p, solve the discharge
///    pressure ratio analytically, and compute T2 and gas power.
pub fn evaluate(
    stage: &Stage,
    model: &dyn FluidModel,
    input: &StageInput,
) -> StageResult<StageOutput> {
    let p1 = match stage.pressure_drop_ahead {
        Some(dp) => pa(input.inlet_pressure.value - dp.value),
        None => input.inlet_pressure,
    };
    if !p1.value.is_finite() || p1.value <= 0.0 {
        return Err(StageError::InfeasibleHead {
            what: "pressure drop ahead of stage leaves non-positive inlet pressure",
        });
    }

    let t1 = stage.inlet_temperature;
    let inlet_state = model.state(p1, t1, input.composition.clone())?;

    let rho1 = inlet_state.density().value;
    let mut q1_am3h = input.mass_flow_kg_s / rho1 * 3600.0;

    let (n_min, n_max) = stage.chart.speed_envelope();
    if !stage.chart.is_single_speed() && (input.speed_rpm < n_min || input.speed_rpm > n_max) {
        return Err(StageError::SpeedOutOfEnvelope {
            speed: input.speed_rpm,
            n_min,
            n_max,
            above: input.speed_rpm > n_max,
        });
    }

    let mut query = stage.chart.query(q1_am3h, input.speed_rpm)?;
    let mut asv_recycle_fraction = 0.0;
    let classification = match query.classification {
        ChartClassification::BelowSurge => {
            let q_before = q1_am3h;
            q1_am3h = query.q_min_effective;
            asv_recycle_fraction = (q1_am3h - q_before) / q1_am3h;
            query = stage.chart.query(q1_am3h, input.speed_rpm)?;
            StageClassification::SurgeRecycle
        }
        ChartClassification::AboveStonewall => StageClassification::Stonewall,
        ChartClassification::Internal => StageClassification::Ok,
    };

    let h_p = query.head_j_per_kg;
    let eta_p = query.efficiency;
    if eta_p <= 0.0 || !h_p.is_finite() {
        return Err(StageError::InfeasibleHead {
            what: "chart returned non-physical head or efficiency",
        });
    }

    let kappa = inlet_state.kappa();
    // (n_p - 1) / n_p = (kappa - 1) / (kappa * eta_p)
    let exponent_ratio = (kappa - 1.0) / (kappa * eta_p);
    if exponent_ratio <= 0.0 {
        return Err(StageError::InfeasibleHead {
            what: "non-positive polytropic exponent ratio",
        });
    }

    let z1 = inlet_state.z_factor();
    let specific_gas_constant = R_GAS_J_PER_MOL_K * 1000.0 / inlet_state.molar_mass();
    // H_p = (1/exponent_ratio) * Z1 * R_specific * T1 * (r^exponent_ratio - 1)
    // => r^exponent_ratio = H_p * exponent_ratio / (Z1 * R_specific * T1) + 1
    let r_pow = h_p * exponent_ratio / (z1 * specific_gas_constant * t1.value) + 1.0;
    if r_pow <= 0.0 {
        return Err(StageError::InfeasibleHead {
            what: "discharge pressure ratio has no positive real solution",
        });
    }
    let pressure_ratio = r_pow.powf(1.0 / exponent_ratio);
    if !pressure_ratio.is_finite() || pressure_ratio <= 0.0 {
        return Err(StageError::InfeasibleHead {
            what: "discharge pressure ratio solved to a non-physical value",
        });
    }

    let t2 = t1.value * r_pow;
    let p2 = p1.value * pressure_ratio;

    // Gas power is evaluated at the elevated (post-recycle) flow; only the
    // original mass flow carries forward into the next stage's balance.
    let effective_mass_flow = rho1 * (q1_am3h / 3600.0);
    let gas_power_w = effective_mass_flow * h_p / eta_p;

    let outlet_state = model.state(pa(p2), k(t2), input.composition.clone())?;

    Ok(StageOutput {
        inlet_state,
        outlet_state,
        pressure_ratio,
        polytropic_head_j_per_kg: h_p,
        polytropic_efficiency: eta_p,
        gas_power_w,
        classification,
        asv_recycle_fraction,
    })
}
