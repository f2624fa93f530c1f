//! ec-fluid: composition-based PVT for the eCalc compressor-train engine.
//!
//! Provides:
//! - the fixed dry-gas component table (`species`)
//! - composition handling (`composition`)
//! - a hand-rolled cubic EOS (SRK/PR, GERG falling back to plain SRK/PR) in
//!   `eos`, evaluated into cached `FluidState`s (`state`)
//! - a `FluidModel` trait binding an EOS choice to state queries (`model`)
//! - stream mixing by mole averaging + enthalpy balance (`mixing`)
//! - Sm³ ↔ mass-rate conversions at standard conditions (`standard`)
//!
//! # Example
//!
//! ```no_run
//! use ec_fluid::{CubicFluidModel, Composition, EosKind, FluidModel};
//! use ec_core::units::{bar, celsius};
//!
//! let model = CubicFluidModel::new("export-gas", EosKind::Srk);
//! let comp = Composition::pure_methane();
//! let state = model.state(bar(50.0), celsius(30.0), comp).unwrap();
//! println!("Density: {} kg/m³", state.density().value);
//! ```

pub mod composition;
pub mod eos;
pub mod error;
pub mod mixing;
pub mod model;
pub mod species;
pub mod standard;
pub mod state;

// Re-exports for ergonomics
pub use composition::Composition;
pub use eos::EosKind;
pub use error::{FluidError, FluidResult};
pub use mixing::{MixInlet, mix_streams};
pub use model::{CubicFluidModel, FluidModel};
pub use species::Species;
pub use standard::{kg_per_s_to_sm3_per_day, sm3_per_day_to_kg_per_s, standard_density};
pub use state::{FluidState, SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput};
