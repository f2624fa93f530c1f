//! Load/save the model schema as YAML or JSON (mirrors the teacher's
//! `tf-project` load/save free functions).

use std::path::Path;

use crate::error::ModelResult;
use crate::schema::EcalcModel;
use crate::validate::validate_model;

pub fn load_yaml(path: impl AsRef<Path>) -> ModelResult<EcalcModel> {
    let text = std::fs::read_to_string(path)?;
    let model: EcalcModel = serde_yaml::from_str(&text)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_yaml(model: &EcalcModel, path: impl AsRef<Path>) -> ModelResult<()> {
    let text = serde_yaml::to_string(model)?;
    std::fs::write(path, text)?;
    Ok(())
}

pub fn load_json(path: impl AsRef<Path>) -> ModelResult<EcalcModel> {
    let text = std::fs::read_to_string(path)?;
    let model: EcalcModel = serde_json::from_str(&text)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_json(model: &EcalcModel, path: impl AsRef<Path>) -> ModelResult<()> {
    let text = serde_json::to_string_pretty(model)?;
    std::fs::write(path, text)?;
    Ok(())
}
