//! Train model and forward evaluation (`spec.md` §3 Train, §4.E Train Solver).

use ec_core::numeric::{BrentConfig, brent_find_root};
use ec_core::units::{bar, to_bar};
use ec_fluid::FluidModel;
use ec_stage::{Stage, StageInput, evaluate as evaluate_stage};
use ec_turbine::ShaftConfig;

use crate::error::{EvaluationStatus, TrainError, TrainResult};
use crate::policy::PressureControlPolicy;
use crate::request::{OperatingRequest, OperatingResult, StageReport};

/// The speed regime a train operates under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedMode {
    /// `SingleSpeedTrain`: every stage runs at one fixed speed.
    Fixed(f64),
    /// `VariableSpeedTrain`: all stages share a common speed, solved for.
    Variable { n_min: f64, n_max: f64 },
}

/// An ordered chain of stages sharing a fluid model, a pressure-control
/// policy, and optional power/pressure limits (`spec.md` §3 Train).
#[derive(Debug, Clone)]
pub struct Train {
    stages: Vec<Stage>,
    policy: PressureControlPolicy,
    speed_mode: SpeedMode,
    shaft: ShaftConfig,
    maximum_power_mw: Option<f64>,
    maximum_discharge_pressure_bar: Option<f64>,
}

impl Train {
    pub fn new(
        stages: Vec<Stage>,
        policy: PressureControlPolicy,
        speed_mode: SpeedMode,
        shaft: ShaftConfig,
        maximum_power_mw: Option<f64>,
        maximum_discharge_pressure_bar: Option<f64>,
    ) -> TrainResult<Self> {
        if stages.is_empty() {
            return Err(TrainError::EmptyTrain);
        }
        if maximum_discharge_pressure_bar.is_some() && policy != PressureControlPolicy::DownstreamChoke {
            return Err(TrainError::MaximumDischargeWithoutDownstreamChoke);
        }
        Ok(Self {
            stages,
            policy,
            speed_mode,
            shaft,
            maximum_power_mw,
            maximum_discharge_pressure_bar,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn policy(&self) -> PressureControlPolicy {
        self.policy
    }

    pub fn shaft(&self) -> &ShaftConfig {
        &self.shaft
    }

    pub fn maximum_power_mw(&self) -> Option<f64> {
        self.maximum_power_mw
    }

    /// Sequential stage composition: apply each stage in order, propagating
    /// outlet pressure/temperature/composition into the next stage's inlet
    /// (`spec.md` §4.E forward evaluation).
    pub fn forward_evaluate(
        &self,
        model: &dyn FluidModel,
        request: &OperatingRequest,
        speed_rpm: f64,
    ) -> TrainResult<OperatingResult> {
        let mut inlet_pressure = request.suction_pressure;
        let mut total_gas_power_w = 0.0;
        let mut total_shaft_power_mw = 0.0;
        let mut stage_reports = Vec::with_capacity(self.stages.len());

        for (stage_index, stage) in self.stages.iter().enumerate() {
            let input = StageInput {
                inlet_pressure,
                composition: request.inlet_composition.clone(),
                mass_flow_kg_s: request.mass_flow_kg_s,
                speed_rpm,
            };
            let output = evaluate_stage(stage, model, &input)?;

            let stage_gas_mw = output.gas_power_w / 1.0e6;
            let stage_shaft_mw = self.shaft.shaft_power_mw(stage_gas_mw);
            total_gas_power_w += output.gas_power_w;
            total_shaft_power_mw += stage_shaft_mw;
            inlet_pressure = output.outlet_state.pressure();

            stage_reports.push(StageReport {
                stage_index,
                speed_rpm,
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

    fn speed_bracket(&self) -> (f64, f64) {
        match self.speed_mode {
            SpeedMode::Fixed(n) => (n, n),
            SpeedMode::Variable { n_min, n_max } => (n_min, n_max),
        }
    }

    /// Solve the train for the given operating request, applying the
    /// configured pressure-control policy (`spec.md` §4.D, §4.E).
    pub fn solve(&self, model: &dyn FluidModel, request: &OperatingRequest) -> TrainResult<OperatingResult> {
        let (n_lo, n_hi) = self.speed_bracket();
        let target_bar = to_bar(request.discharge_pressure_target);

        match self.policy {
            PressureControlPolicy::DownstreamChoke => {
                self.solve_downstream_choke(model, request, n_lo, n_hi, target_bar)
            }
            PressureControlPolicy::UpstreamChoke => self.solve_upstream_choke(model, request, n_hi, target_bar),
            PressureControlPolicy::CommonAsv
            | PressureControlPolicy::IndividualAsvPressure
            | PressureControlPolicy::IndividualAsvRate => {
                // `spec.md` §9 leaves per-stage ASV distribution under-specified for a
                // minimum-viable port; both individual policies are implemented here as
                // a single train-wide recycle loop (documented in DESIGN.md), which
                // matches the tested COMMON_ASV scenario exactly and is a conservative
                // approximation of the per-stage variants.
                self.solve_common_asv(model, request, n_hi, target_bar)
            }
        }
    }

    fn solve_downstream_choke(
        &self,
        model: &dyn FluidModel,
        request: &OperatingRequest,
        n_lo: f64,
        n_hi: f64,
        target_bar: f64,
    ) -> TrainResult<OperatingResult> {
        let at_n_lo = self.forward_evaluate(model, request, n_lo)?;

        let mut result = if (n_hi - n_lo).abs() < 1e-9 {
            // Fixed-speed train: no speed freedom, only choking is available.
            if at_n_lo.discharge_pressure_bar + 1e-6 < target_bar {
                return Err(TrainError::Infeasible {
                    what: "train cannot reach target discharge pressure at its fixed speed",
                });
            }
            at_n_lo
        } else if at_n_lo.discharge_pressure_bar >= target_bar {
            // Already at or above target pressure at minimum speed.
            at_n_lo
        } else {
            let at_n_hi = self.forward_evaluate(model, request, n_hi)?;
            if at_n_hi.discharge_pressure_bar < target_bar {
                return Err(TrainError::Infeasible {
                    what: "train cannot reach target discharge pressure even at maximum speed",
                });
            }
            let residual = |n: f64| -> f64 {
                match self.forward_evaluate(model, request, n) {
                    Ok(r) => r.discharge_pressure_bar - target_bar,
                    Err(_) => 1.0e6,
                }
            };
            let brent = brent_find_root(n_lo, n_hi, residual, BrentConfig::default()).map_err(|_| {
                TrainError::DidNotConverge {
                    what: "speed root-find for DOWNSTREAM_CHOKE",
                }
            })?;
            if !brent.converged {
                return Err(TrainError::DidNotConverge {
                    what: "speed root-find for DOWNSTREAM_CHOKE",
                });
            }
            self.forward_evaluate(model, request, brent.root)?
        };

        if let Some(max_bar) = self.maximum_discharge_pressure_bar {
            if result.discharge_pressure_bar > max_bar + 1e-9 {
                // Re-solve at a reduced suction pressure so the natural discharge
                // equals MAXIMUM_DISCHARGE_PRESSURE, then choke the remainder.
                result = self.solve_upstream_choke(model, request, n_hi, max_bar)?;
            }
        }

        self.finalize(result, Some(target_bar))
    }

    fn solve_upstream_choke(
        &self,
        model: &dyn FluidModel,
        request: &OperatingRequest,
        n: f64,
        target_bar: f64,
    ) -> TrainResult<OperatingResult> {
        let p_s_max = to_bar(request.suction_pressure);
        let p_s_min = (p_s_max * 0.05).max(0.1);

        let residual = |p_s_bar: f64| -> f64 {
            let mut req = request.clone();
            req.suction_pressure = bar(p_s_bar);
            match self.forward_evaluate(model, &req, n) {
                Ok(r) => r.discharge_pressure_bar - target_bar,
                Err(_) => -1.0e6,
            }
        };

        let brent = brent_find_root(p_s_min, p_s_max, residual, BrentConfig::default()).map_err(|_| {
            TrainError::Infeasible {
                what: "UPSTREAM_CHOKE cannot reach target discharge pressure by reducing suction pressure",
            }
        })?;
        if !brent.converged {
            return Err(TrainError::DidNotConverge {
                what: "suction-pressure root-find for UPSTREAM_CHOKE",
            });
        }

        let mut req = request.clone();
        req.suction_pressure = bar(brent.root);
        let result = self.forward_evaluate(model, &req, n)?;
        self.finalize(result, None)
    }

    fn solve_common_asv(
        &self,
        model: &dyn FluidModel,
        request: &OperatingRequest,
        n: f64,
        target_bar: f64,
    ) -> TrainResult<OperatingResult> {
        let recycle_upper_bound = request.mass_flow_kg_s * 10.0 + 1.0;

        let residual = |recycle_kg_s: f64| -> f64 {
            let mut req = request.clone();
            req.mass_flow_kg_s = request.mass_flow_kg_s + recycle_kg_s;
            match self.forward_evaluate(model, &req, n) {
                Ok(r) => r.discharge_pressure_bar - target_bar,
                Err(_) => -1.0e6,
            }
        };

        let brent = brent_find_root(0.0, recycle_upper_bound, residual, BrentConfig::default()).map_err(|_| {
            TrainError::Infeasible {
                what: "anti-surge recycle cannot reach target discharge pressure",
            }
        })?;
        if !brent.converged {
            return Err(TrainError::DidNotConverge {
                what: "recycle root-find for COMMON_ASV",
            });
        }

        let mut req = request.clone();
        req.mass_flow_kg_s = request.mass_flow_kg_s + brent.root;
        let mut result = self.forward_evaluate(model, &req, n)?;
        result.asv_recycle_fraction = brent.root / req.mass_flow_kg_s;
        self.finalize(result, None)
    }

    fn finalize(&self, mut result: OperatingResult, discharge_override_bar: Option<f64>) -> TrainResult<OperatingResult> {
        if let Some(bar_val) = discharge_override_bar {
            result.discharge_pressure_bar = bar_val;
        }
        if let Some(limit) = self.maximum_power_mw {
            if result.total_shaft_power_mw > limit {
                return Err(TrainError::PowerLimitExceeded {
                    actual_mw: result.total_shaft_power_mw,
                    limit_mw: limit,
                });
            }
        }
        result.status = EvaluationStatus::Ok;
        Ok(result)
    }
}

/// Solve a multi-stream train with interstage-pressure control (`spec.md`
/// §4.E "Multi-stream train with interstage control"): the front subtrain
/// solves `P_s -> P_i` (`UpstreamChoke`), the back subtrain solves
/// `P_i -> P_d` (`DownstreamChoke`), each running its own speed root-find.
/// Composition carries across the split point unchanged; no train-wide
/// coupling beyond that.
pub fn solve_interstage(
    front: &Train,
    back: &Train,
    model: &dyn FluidModel,
    request: &OperatingRequest,
    interstage_pressure_bar: f64,
    maximum_power_mw: Option<f64>,
) -> TrainResult<OperatingResult> {
    let mut front_request = request.clone();
    front_request.discharge_pressure_target = bar(interstage_pressure_bar);
    front_request.interstage_pressure_target = None;
    let front_result = front.solve(model, &front_request)?;

    let mut back_request = request.clone();
    back_request.suction_pressure = bar(front_result.discharge_pressure_bar);
    back_request.interstage_pressure_target = None;
    let back_result = back.solve(model, &back_request)?;

    let front_stage_count = front_result.stage_reports.len();
    let mut stage_reports = front_result.stage_reports;
    stage_reports.extend(back_result.stage_reports.into_iter().map(|mut report| {
        report.stage_index += front_stage_count;
        report
    }));

    let result = OperatingResult {
        discharge_pressure_bar: back_result.discharge_pressure_bar,
        total_gas_power_mw: front_result.total_gas_power_mw + back_result.total_gas_power_mw,
        total_shaft_power_mw: front_result.total_shaft_power_mw + back_result.total_shaft_power_mw,
        asv_recycle_fraction: 0.0,
        stage_reports,
        status: EvaluationStatus::Ok,
    };

    if let Some(limit) = maximum_power_mw {
        if result.total_shaft_power_mw > limit {
            return Err(TrainError::PowerLimitExceeded {
                actual_mw: result.total_shaft_power_mw,
                limit_mw: limit,
            });
        }
    }
    Ok(result)
}
