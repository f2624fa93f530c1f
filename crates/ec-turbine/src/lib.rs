//! ec-turbine: load→efficiency→fuel-rate conversion and the shaft /
//! mechanical-efficiency wrapper (`spec.md` §4.G, §4.H).

pub mod error;
pub mod shaft;
pub mod turbine;

pub use error::{TurbineError, TurbineResult};
pub use shaft::ShaftConfig;
pub use turbine::TurbineCurve;
