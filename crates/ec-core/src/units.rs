// ec-core/src/units.rs
//
// Canonical unit wrappers (uom, SI, f64). Internal state is always SI
// (Pa, K, kg/s, J/kg, W); the bar/°C/Sm³/day/Am³/h conventions from
// `spec.md` §6 live only at the constructors below and at the model/CLI
// boundary.

use uom::si::f64::{
    Energy as UomEnergy, Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Volume as UomVolume, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

/// Construct a pressure from bar absolute, the input convention of `spec.md` §6.
#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

/// Read a pressure back out in bar absolute, for reports.
#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

/// Construct a temperature from degrees Celsius, the input convention of `spec.md` §6.
#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

/// Read a temperature back out in degrees Celsius, for reports.
#[inline]
pub fn to_celsius(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

/// Actual volumetric flow in cubic meters per hour (compressor-chart convention).
#[inline]
pub fn am3_per_hour(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_hour;
    VolumeRate::new::<cubic_meter_per_hour>(v)
}

#[inline]
pub fn to_am3_per_hour(q: VolumeRate) -> f64 {
    use uom::si::volume_rate::cubic_meter_per_hour;
    q.get::<cubic_meter_per_hour>()
}

#[inline]
pub fn watt(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

/// Construct a power from megawatts, the reporting convention of `spec.md` §6.
#[inline]
pub fn megawatt(v: f64) -> Power {
    use uom::si::power::megawatt;
    Power::new::<megawatt>(v)
}

#[inline]
pub fn to_megawatt(p: Power) -> f64 {
    use uom::si::power::megawatt;
    p.get::<megawatt>()
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Convert head from meters (declared chart unit) to J/kg: `H = g·H_m`.
#[inline]
pub fn head_m_to_j_per_kg(h_m: f64) -> f64 {
    h_m * constants::STANDARD_GRAVITY_M_PER_S2
}

/// Inverse of [`head_m_to_j_per_kg`], for reports declared in meters.
#[inline]
pub fn head_j_per_kg_to_m(h_j_per_kg: f64) -> f64 {
    h_j_per_kg / constants::STANDARD_GRAVITY_M_PER_S2
}

/// Convert head from kJ/kg (declared chart unit) to J/kg.
#[inline]
pub fn head_kj_per_kg_to_j_per_kg(h_kj_per_kg: f64) -> f64 {
    h_kj_per_kg * 1_000.0
}

/// Inverse of [`head_kj_per_kg_to_j_per_kg`], for reports declared in kJ/kg.
#[inline]
pub fn head_j_per_kg_to_kj_per_kg(h_j_per_kg: f64) -> f64 {
    h_j_per_kg / 1_000.0
}

pub mod constants {
    /// Universal gas constant [J/(mol·K)].
    pub const R_GAS_J_PER_MOL_K: f64 = 8.314_462_618;

    /// Standard gravity, for head unit conversions between meters and J/kg.
    pub const STANDARD_GRAVITY_M_PER_S2: f64 = 9.806_65;

    /// Standard conditions per `spec.md` GLOSSARY: 1.01325 bar, 288.15 K (15 °C).
    pub const STANDARD_PRESSURE_BAR: f64 = 1.013_25;
    pub const STANDARD_TEMPERATURE_K: f64 = 288.15;

    /// Reference state for enthalpy/entropy departures (`spec.md` §4.A).
    pub const REFERENCE_TEMPERATURE_K: f64 = 288.15;
    pub const REFERENCE_PRESSURE_BAR: f64 = 1.013_25;

    /// Seconds in a calendar day, used for Sm³/day <-> kg/s conversions.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(300.0);
        let _mdot = kgps(1.2);
        let _l = m(2.0);
        let _dt = s(0.1);
        let _r = unitless(0.5);
    }

    #[test]
    fn head_meter_round_trip_is_idempotent() {
        // Invariant 9: M -> J/kg -> M returns the original head.
        let h_m = 1_234.5;
        let h_j_per_kg = head_m_to_j_per_kg(h_m);
        assert!((head_j_per_kg_to_m(h_j_per_kg) - h_m).abs() < 1e-9);
    }

    #[test]
    fn head_kj_round_trip_is_idempotent() {
        let h_kj = 80.0;
        let h_j = head_kj_per_kg_to_j_per_kg(h_kj);
        assert!((head_j_per_kg_to_kj_per_kg(h_j) - h_kj).abs() < 1e-9);
    }

    #[test]
    fn bar_round_trip() {
        let p = bar(20.0);
        assert!((to_bar(p) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn celsius_round_trip() {
        let t = celsius(30.0);
        assert!((t.value - 303.15).abs() < 1e-6);
        assert!((to_celsius(t) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn megawatt_round_trip() {
        let p = megawatt(2.5);
        assert!((p.value - 2.5e6).abs() < 1e-3);
        assert!((to_megawatt(p) - 2.5).abs() < 1e-9);
    }
}
