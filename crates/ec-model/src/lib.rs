//! ec-model: the on-disk model schema (`spec.md` §6), its expression
//! sublanguage, and load/save/validate helpers.

pub mod error;
pub mod expr;
pub mod loader;
pub mod schema;
pub mod validate;

pub use error::{ModelError, ModelResult, ValidationError};
pub use expr::{BinOp, CmpOp, ExprContext, ExprError, ExprNode};
pub use loader::{load_json, load_yaml, save_json, save_yaml};
pub use schema::{
    ChartCurveDef, ChartDef, CompositionDef, ControlMarginDef, EcalcModel, EfficiencyUnitDef,
    EosTagDef, FuelTypeDef, HeadUnitDef, InstallationDef, PressureControlPolicyDef, StageDef,
    TrainModelDef, TrainTypeDef,
};
pub use validate::validate_model;
