//! ec-chart: compressor chart representation and querying.
//!
//! Provides `ChartCurve` (a single speed's Q/H/η arrays), `CompressorChart`
//! (single- or variable-speed, with a surge control margin), and generic
//! chart realization via affinity laws (`generic`).

pub mod chart;
pub mod curve;
pub mod error;
pub mod generic;

pub use chart::{ChartClassification, ChartQuery, CompressorChart, ControlMargin};
pub use curve::ChartCurve;
pub use error::{ChartError, ChartResult};
pub use generic::{ShapePoint, canonical_shape, realize as realize_generic_chart};
