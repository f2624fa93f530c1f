//! Pressure-control policies (`spec.md` §4.D).

/// How the train closes the gap between its natural discharge pressure and
/// the operating request's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureControlPolicy {
    /// Run at excess pressure and choke down; the only policy compatible
    /// with a `MAXIMUM_DISCHARGE_PRESSURE` cap.
    DownstreamChoke,
    /// Reduce suction pressure until the train naturally produces the
    /// target discharge pressure.
    UpstreamChoke,
    /// Per-stage recycle increased to match an equal pressure-ratio
    /// distribution across stages.
    IndividualAsvPressure,
    /// Per-stage recycle increased by an equal mass rate across stages.
    IndividualAsvRate,
    /// A single recycle loop around the entire train.
    CommonAsv,
}
