//! Dry-gas component table.
//!
//! `spec.md` §3 fixes the closed component set eCalc normalizes
//! compositions over. Methane is required; the rest are optional trace
//! or inert components typical of associated/dry gas.

/// One component of the fixed dry-gas set (`spec.md` §3 Composition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Water,
    Nitrogen,
    CO2,
    Methane,
    Ethane,
    Propane,
    IButane,
    NButane,
    IPentane,
    NPentane,
    NHexane,
}

impl Species {
    pub const ALL: [Species; 11] = [
        Species::Water,
        Species::Nitrogen,
        Species::CO2,
        Species::Methane,
        Species::Ethane,
        Species::Propane,
        Species::IButane,
        Species::NButane,
        Species::IPentane,
        Species::NPentane,
        Species::NHexane,
    ];

    /// Canonical lowercase key, matching the model keys of `spec.md` §6.
    pub fn key(&self) -> &'static str {
        match self {
            Species::Water => "water",
            Species::Nitrogen => "nitrogen",
            Species::CO2 => "CO2",
            Species::Methane => "methane",
            Species::Ethane => "ethane",
            Species::Propane => "propane",
            Species::IButane => "i_butane",
            Species::NButane => "n_butane",
            Species::IPentane => "i_pentane",
            Species::NPentane => "n_pentane",
            Species::NHexane => "n_hexane",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Species::Water => "Water",
            Species::Nitrogen => "Nitrogen",
            Species::CO2 => "Carbon Dioxide",
            Species::Methane => "Methane",
            Species::Ethane => "Ethane",
            Species::Propane => "Propane",
            Species::IButane => "Isobutane",
            Species::NButane => "n-Butane",
            Species::IPentane => "Isopentane",
            Species::NPentane => "n-Pentane",
            Species::NHexane => "n-Hexane",
        }
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::Water => 18.015,
            Species::Nitrogen => 28.014,
            Species::CO2 => 44.010,
            Species::Methane => 16.043,
            Species::Ethane => 30.070,
            Species::Propane => 44.097,
            Species::IButane => 58.123,
            Species::NButane => 58.123,
            Species::IPentane => 72.150,
            Species::NPentane => 72.150,
            Species::NHexane => 86.177,
        }
    }

    /// Critical temperature [K].
    pub fn critical_temperature_k(&self) -> f64 {
        match self {
            Species::Water => 647.10,
            Species::Nitrogen => 126.20,
            Species::CO2 => 304.20,
            Species::Methane => 190.60,
            Species::Ethane => 305.40,
            Species::Propane => 369.80,
            Species::IButane => 408.10,
            Species::NButane => 425.20,
            Species::IPentane => 460.40,
            Species::NPentane => 469.70,
            Species::NHexane => 507.60,
        }
    }

    /// Critical pressure \[bar\].
    pub fn critical_pressure_bar(&self) -> f64 {
        match self {
            Species::Water => 220.64,
            Species::Nitrogen => 34.00,
            Species::CO2 => 73.83,
            Species::Methane => 46.00,
            Species::Ethane => 48.80,
            Species::Propane => 42.49,
            Species::IButane => 36.48,
            Species::NButane => 38.00,
            Species::IPentane => 33.84,
            Species::NPentane => 33.70,
            Species::NHexane => 30.25,
        }
    }

    /// Acentric factor ω, used by the SRK/PR α(T) correlation.
    pub fn acentric_factor(&self) -> f64 {
        match self {
            Species::Water => 0.344,
            Species::Nitrogen => 0.038,
            Species::CO2 => 0.224,
            Species::Methane => 0.008,
            Species::Ethane => 0.098,
            Species::Propane => 0.152,
            Species::IButane => 0.176,
            Species::NButane => 0.193,
            Species::IPentane => 0.227,
            Species::NPentane => 0.251,
            Species::NHexane => 0.296,
        }
    }

    /// Ideal-gas molar heat capacity polynomial coefficients, `cp0 = a + b*T + c*T^2`
    /// [J/(mol·K)], T in Kelvin. Simplified empirical fits (allowed by `spec.md`
    /// §4.A: "Ideal-gas cp uses per-component polynomials in T").
    pub fn ideal_gas_cp_coeffs(&self) -> [f64; 3] {
        match self {
            Species::Water => [33.80, -0.0008, 3.29e-6],
            Species::Nitrogen => [29.10, -0.0017, 4.0e-6],
            Species::CO2 => [22.26, 0.0597, -3.50e-5],
            Species::Methane => [19.89, 0.0502, 1.27e-5],
            Species::Ethane => [6.90, 0.1727, -6.40e-5],
            Species::Propane => [-4.22, 0.3063, -1.59e-4],
            Species::IButane => [-1.39, 0.3847, -1.846e-4],
            Species::NButane => [9.49, 0.3313, -1.108e-4],
            Species::IPentane => [-9.53, 0.5066, -2.73e-4],
            Species::NPentane => [-3.63, 0.4873, -2.58e-4],
            Species::NHexane => [-4.41, 0.5822, -3.12e-4],
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WATER" | "H2O" => Ok(Species::Water),
            "NITROGEN" | "N2" => Ok(Species::Nitrogen),
            "CO2" | "CARBON DIOXIDE" | "CARBONDIOXIDE" => Ok(Species::CO2),
            "METHANE" | "CH4" => Ok(Species::Methane),
            "ETHANE" | "C2H6" => Ok(Species::Ethane),
            "PROPANE" | "C3H8" => Ok(Species::Propane),
            "I_BUTANE" | "ISOBUTANE" | "I-BUTANE" => Ok(Species::IButane),
            "N_BUTANE" | "N-BUTANE" | "BUTANE" => Ok(Species::NButane),
            "I_PENTANE" | "ISOPENTANE" | "I-PENTANE" => Ok(Species::IPentane),
            "N_PENTANE" | "N-PENTANE" | "PENTANE" => Ok(Species::NPentane),
            "N_HEXANE" | "N-HEXANE" | "HEXANE" => Ok(Species::NHexane),
            _ => Err("unknown dry-gas component"),
        }
    }
}
