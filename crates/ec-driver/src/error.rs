//! Driver error ladder: `ModelInvalid` at construction, surfaced fatally;
//! per-period `EvaluationFailure`s never appear here (`spec.md` §7) — they
//! are reported as a `PeriodStatus` on the period result instead.

use ec_core::EcError;
use thiserror::Error;

pub type DriverResult<T> = Result<T, DriverError>;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("model invalid: {what}")]
    ModelInvalid { what: String },

    #[error(transparent)]
    Model(#[from] ec_model::ModelError),

    #[error(transparent)]
    Fluid(#[from] ec_fluid::FluidError),

    #[error(transparent)]
    Chart(#[from] ec_chart::ChartError),

    #[error(transparent)]
    Stage(#[from] ec_stage::StageError),

    #[error(transparent)]
    Turbine(#[from] ec_turbine::TurbineError),

    #[error(transparent)]
    Train(#[from] ec_train::TrainError),

    #[error("run cancelled after {completed_periods} of {total_periods} periods")]
    Cancelled {
        completed_periods: usize,
        total_periods: usize,
    },
}

impl From<DriverError> for EcError {
    fn from(err: DriverError) -> Self {
        EcError::InvalidArg {
            what: Box::leak(err.to_string().into_boxed_str()),
        }
    }
}
