//! ec-core: stable foundation for the eCalc compressor-train engine.
//!
//! Contains:
//! - units (uom SI types + bar/°C/Sm³/MW constructors)
//! - numeric (Real + tolerances + Brent root-finder + bisection)
//! - ids (stable compact IDs for stages/streams/charts)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{EcError, EcResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
