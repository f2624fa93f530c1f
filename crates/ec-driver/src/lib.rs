//! ec-driver: wires a parsed `ec_model::EcalcModel` into runtime
//! `ec_train::Train`/`ec_fluid::FluidModel`/`ec_turbine` objects
//! (`build`) and drives them across a time-series of periods (`timeseries`),
//! with cancellation (`cancellation`) and progress reporting (`progress`).

pub mod build;
pub mod cancellation;
pub mod error;
pub mod progress;
pub mod timeseries;

pub use build::{BuiltTrain, StageDesignHint, TrainSolveStrategy, build_train, resolve_simplified_train_sizing};
pub use cancellation::CancellationToken;
pub use error::{DriverError, DriverResult};
pub use progress::{ProgressEvent, ProgressSink};
pub use timeseries::{InstallationProgram, PeriodResult, compile_installation, run_time_series};
