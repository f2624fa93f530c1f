//! Structural validation of a loaded `EcalcModel` (`spec.md` §7): duplicate
//! names, dangling references, and unparsable expressions are rejected at
//! load time rather than surfacing mid-run.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::expr;
use crate::schema::EcalcModel;

pub fn validate_model(model: &EcalcModel) -> Result<(), ValidationError> {
    let mut fuel_names = HashSet::new();
    for fuel in &model.fuel_types {
        if !fuel_names.insert(fuel.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: fuel.name.clone(),
                context: "FUEL_TYPES",
            });
        }
        if fuel.loads_mw.len() != fuel.efficiencies.len() || fuel.loads_mw.len() < 2 {
            return Err(ValidationError::InvalidValue {
                field: "LOADS_MW/EFFICIENCIES",
                reason: "must have equal, non-degenerate lengths".to_string(),
            });
        }
    }

    let mut model_names = HashSet::new();
    for train_model in &model.models {
        if !model_names.insert(train_model.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: train_model.name.clone(),
                context: "MODELS",
            });
        }
        if train_model.stages.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "STAGES",
                reason: "train must have at least one stage".to_string(),
            });
        }
        if let Some(fuel_type) = &train_model.fuel_type {
            if !fuel_names.contains(fuel_type.as_str()) {
                return Err(ValidationError::MissingReference {
                    name: fuel_type.clone(),
                    context: "MODELS.FUEL_TYPE",
                });
            }
        }
    }

    let mut installation_names = HashSet::new();
    for installation in &model.installations {
        if !installation_names.insert(installation.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: installation.name.clone(),
                context: "INSTALLATIONS",
            });
        }
        if !model_names.contains(installation.model.as_str()) {
            return Err(ValidationError::MissingReference {
                name: installation.model.clone(),
                context: "INSTALLATIONS.MODEL",
            });
        }
        validate_expr(&installation.rate_expr, "RATE_SM3_PER_DAY")?;
        validate_expr(&installation.suction_pressure_expr, "SUCTION_PRESSURE_BAR")?;
        validate_expr(&installation.discharge_pressure_expr, "DISCHARGE_PRESSURE_BAR")?;
        if let Some(expr) = &installation.interstage_pressure_expr {
            validate_expr(expr, "INTERSTAGE_PRESSURE_BAR")?;
        }
        if let Some(expr) = &installation.condition_expr {
            validate_expr(expr, "CONDITION")?;
        }
    }

    Ok(())
}

fn validate_expr(source: &str, field: &'static str) -> Result<(), ValidationError> {
    expr::parse(source)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidValue {
            field,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        ChartCurveDef, ChartDef, CompositionDef, ControlMarginDef, EosTagDef, FuelTypeDef,
        InstallationDef, PressureControlPolicyDef, StageDef, TrainModelDef, TrainTypeDef,
    };

    fn sample_model() -> EcalcModel {
        let curve = ChartCurveDef {
            speed_rpm: 8000.0,
            flow_am3_per_hour: vec![1000.0, 2000.0],
            head: vec![80_000.0, 70_000.0],
            head_unit: Default::default(),
            efficiency: vec![0.75, 0.73],
            efficiency_unit: Default::default(),
        };
        let stage = StageDef {
            inlet_temperature_c: 30.0,
            chart: ChartDef::SingleSpeed {
                curve,
                control_margin: ControlMarginDef::default(),
            },
            pressure_drop_ahead_of_stage_bar: None,
            interstage_control_pressure_bar: None,
        };
        let train = TrainModelDef {
            name: "train-a".to_string(),
            eos: EosTagDef::Srk,
            composition: CompositionDef::Pure {
                species: "methane".to_string(),
            },
            train_type: TrainTypeDef::SingleSpeed,
            policy: PressureControlPolicyDef::DownstreamChoke,
            stages: vec![stage],
            maximum_pressure_ratio_per_stage: None,
            maximum_power_mw: None,
            maximum_discharge_pressure_bar: None,
            mechanical_efficiency: None,
            power_adjustment_factor: None,
            power_adjustment_constant_mw: None,
            fuel_type: None,
            calculate_max_rate: false,
        };
        let installation = InstallationDef {
            name: "install-a".to_string(),
            model: "train-a".to_string(),
            rate_expr: "RATE;GAS".to_string(),
            suction_pressure_expr: "20.0".to_string(),
            discharge_pressure_expr: "80.0".to_string(),
            interstage_pressure_expr: None,
            condition_expr: None,
        };
        EcalcModel {
            fuel_types: vec![FuelTypeDef {
                name: "fuel-gas".to_string(),
                lhv_mj_per_sm3: 38.0,
                loads_mw: vec![0.0, 10.0, 20.0],
                efficiencies: vec![0.0, 0.30, 0.36],
            }],
            models: vec![train],
            installations: vec![installation],
        }
    }

    #[test]
    fn accepts_a_consistent_model() {
        assert!(validate_model(&sample_model()).is_ok());
    }

    #[test]
    fn rejects_duplicate_model_names() {
        let mut model = sample_model();
        let duplicate = model.models[0].clone();
        model.models.push(duplicate);
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::DuplicateName { context: "MODELS", .. })
        ));
    }

    #[test]
    fn rejects_dangling_installation_reference() {
        let mut model = sample_model();
        model.installations[0].model = "does-not-exist".to_string();
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn rejects_unparsable_expression() {
        let mut model = sample_model();
        model.installations[0].rate_expr = "NOT_VALID".to_string();
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::InvalidValue { field: "RATE_SM3_PER_DAY", .. })
        ));
    }
}
