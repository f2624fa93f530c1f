//! Cubic equation-of-state thermodynamics (SRK / PR) over the dry-gas
//! component set.
//!
//! `spec.md` §4.A: `P = RT/(v-b) - aα(T)/((v+εb)(v+σb))`, with quadratic
//! mixing rules on `aα` and linear mixing on `b`. GERG variants fall back to
//! plain SRK/PR (the "allowed simplification" the spec permits when flagged
//! at model load).

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use ec_core::units::constants::{R_GAS_J_PER_MOL_K, REFERENCE_PRESSURE_BAR, REFERENCE_TEMPERATURE_K};

/// Cubic equation of state variant attached to a fluid model, not a state
/// (`spec.md` §3 FluidState: "EOS tag ... lives on the fluid model").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EosKind {
    Srk,
    Pr,
    GergSrk,
    GergPr,
}

impl EosKind {
    /// `(ε, σ)` shape parameters of the cubic.
    fn eps_sigma(self) -> (f64, f64) {
        match self {
            EosKind::Srk | EosKind::GergSrk => (0.0, 1.0),
            EosKind::Pr | EosKind::GergPr => (1.0 - 2f64.sqrt(), 1.0 + 2f64.sqrt()),
        }
    }

    /// `(Ωa, Ωb)` critical-point shape constants.
    fn omega_a_b(self) -> (f64, f64) {
        match self {
            EosKind::Srk | EosKind::GergSrk => (0.427_480_23, 0.086_640_35),
            EosKind::Pr | EosKind::GergPr => (0.457_24, 0.077_80),
        }
    }

    fn alpha_m(self, acentric: f64) -> f64 {
        match self {
            EosKind::Srk | EosKind::GergSrk => {
                0.480 + 1.574 * acentric - 0.176 * acentric * acentric
            }
            EosKind::Pr | EosKind::GergPr => {
                0.374_64 + 1.542_26 * acentric - 0.269_92 * acentric * acentric
            }
        }
    }
}

/// Static binary interaction coefficients for CO2/N2/H2O pairs
/// (`spec.md` §4.A: "declared as a static table — implementation may use
/// the GPA public constants"). All other pairs default to 0.
fn binary_interaction(a: Species, b: Species) -> f64 {
    use Species::*;
    let pair = |x: Species, y: Species| -> Option<f64> {
        match (x, y) {
            (CO2, Methane) => Some(0.120),
            (CO2, Ethane) => Some(0.150),
            (CO2, Propane) => Some(0.150),
            (CO2, Nitrogen) => Some(-0.020),
            (Nitrogen, Methane) => Some(0.036),
            (Nitrogen, Ethane) => Some(0.050),
            (Nitrogen, Propane) => Some(0.080),
            (Water, Methane) => Some(0.480),
            (Water, CO2) => Some(0.120),
            (Water, Nitrogen) => Some(0.350),
            _ => None,
        }
    };
    pair(a, b).or_else(|| pair(b, a)).unwrap_or(0.0)
}

struct PureParams {
    a: f64,
    b: f64,
    alpha: f64,
    dalpha_dt: f64,
}

fn pure_params(eos: EosKind, species: Species, t_k: f64) -> PureParams {
    let r = R_GAS_J_PER_MOL_K;
    let tc = species.critical_temperature_k();
    let pc = species.critical_pressure_bar() * 1.0e5;
    let (omega_a, omega_b) = eos.omega_a_b();
    let a = omega_a * r * r * tc * tc / pc;
    let b = omega_b * r * tc / pc;
    let m = eos.alpha_m(species.acentric_factor());
    let sqrt_tr = (t_k / tc).sqrt();
    let bracket = 1.0 + m * (1.0 - sqrt_tr);
    let alpha = bracket * bracket;
    let dalpha_dt = -m * bracket / (t_k * tc).sqrt();
    PureParams {
        a,
        b,
        alpha,
        dalpha_dt,
    }
}

/// Mixture `(aα, d(aα)/dT, b)` via the quadratic/linear mixing rules of
/// `spec.md` §4.A.
fn mixture_aalpha_b(eos: EosKind, comp: &Composition, t_k: f64) -> (f64, f64, f64) {
    let components: Vec<(Species, f64, PureParams)> = comp
        .iter()
        .map(|(species, x)| (species, x, pure_params(eos, species, t_k)))
        .collect();

    let b_mix: f64 = components.iter().map(|(_, x, p)| x * p.b).sum();

    let mut aalpha_mix = 0.0;
    let mut daalpha_dt_mix = 0.0;
    for (si, xi, pi) in &components {
        let aalpha_i = pi.a * pi.alpha;
        let daalpha_i = pi.a * pi.dalpha_dt;
        for (sj, xj, pj) in &components {
            let aalpha_j = pj.a * pj.alpha;
            let daalpha_j = pj.a * pj.dalpha_dt;
            let kij = binary_interaction(*si, *sj);
            let sqrt_term = (aalpha_i * aalpha_j).sqrt();
            aalpha_mix += xi * xj * sqrt_term * (1.0 - kij);
            if sqrt_term > 0.0 {
                let dsqrt = (aalpha_j * daalpha_i + aalpha_i * daalpha_j) / (2.0 * sqrt_term);
                daalpha_dt_mix += xi * xj * dsqrt * (1.0 - kij);
            }
        }
    }
    (aalpha_mix, daalpha_dt_mix, b_mix)
}

/// Real roots of the monic depressed cubic `Z^3 + p Z^2 + q Z + r = 0`.
fn solve_monic_cubic(p: f64, q: f64, r: f64) -> Vec<f64> {
    let shift = p / 3.0;
    let pp = q - p * p / 3.0;
    let qq = 2.0 * p.powi(3) / 27.0 - p * q / 3.0 + r;
    let disc = (qq / 2.0).powi(2) + (pp / 3.0).powi(3);

    let cbrt = |x: f64| x.signum() * x.abs().cbrt();

    if disc > 1e-14 {
        let sqrt_disc = disc.sqrt();
        let u = cbrt(-qq / 2.0 + sqrt_disc);
        let v = cbrt(-qq / 2.0 - sqrt_disc);
        vec![u + v - shift]
    } else if pp.abs() < 1e-14 {
        vec![-shift, -shift, -shift]
    } else {
        let m = 2.0 * (-pp / 3.0).sqrt();
        let arg = ((3.0 * qq) / (2.0 * pp) * (-3.0 / pp).sqrt()).clamp(-1.0, 1.0);
        let theta = arg.acos() / 3.0;
        (0..3)
            .map(|n| {
                m * (theta - 2.0 * std::f64::consts::PI * n as f64 / 3.0).cos() - shift
            })
            .collect()
    }
}

/// Select the gas-phase compressibility factor: the largest real root with
/// `Z > B` (`spec.md` §4.A Root selection).
fn select_gas_root(eos: EosKind, a_dimless: f64, b_dimless: f64) -> FluidResult<f64> {
    let (eps, sigma) = eos.eps_sigma();
    let roots = match eos {
        EosKind::Srk | EosKind::GergSrk => solve_monic_cubic(
            -1.0,
            a_dimless - b_dimless - b_dimless * b_dimless,
            -a_dimless * b_dimless,
        ),
        EosKind::Pr | EosKind::GergPr => {
            let _ = (eps, sigma);
            solve_monic_cubic(
                -(1.0 - b_dimless),
                a_dimless - 2.0 * b_dimless - 3.0 * b_dimless * b_dimless,
                -(a_dimless * b_dimless - b_dimless * b_dimless - b_dimless.powi(3)),
            )
        }
    };

    roots
        .into_iter()
        .filter(|z| z.is_finite() && *z > b_dimless && *z < 10.0)
        .fold(None, |best, z| match best {
            None => Some(z),
            Some(b) if z > b => Some(z),
            some => some,
        })
        .ok_or(FluidError::CubicNoGasRoot)
}

fn ideal_gas_cp_molar(comp: &Composition, t_k: f64) -> f64 {
    comp.iter()
        .map(|(species, x)| {
            let [a, b, c] = species.ideal_gas_cp_coeffs();
            x * (a + b * t_k + c * t_k * t_k)
        })
        .sum()
}

/// `∫_{Tref}^{T} cp0(T') dT'` per mole, integrating the mixture's
/// mole-weighted ideal-gas polynomial analytically.
fn ideal_gas_enthalpy_molar(comp: &Composition, t_k: f64) -> f64 {
    let t_ref = REFERENCE_TEMPERATURE_K;
    comp.iter()
        .map(|(species, x)| {
            let [a, b, c] = species.ideal_gas_cp_coeffs();
            x * (a * (t_k - t_ref) + b / 2.0 * (t_k * t_k - t_ref * t_ref)
                + c / 3.0 * (t_k.powi(3) - t_ref.powi(3)))
        })
        .sum()
}

/// `∫_{Tref}^{T} cp0/T' dT' - R ln(P/Pref)` per mole (mixing entropy of
/// ideal gas is neglected: a documented simplification, see `DESIGN.md`).
fn ideal_gas_entropy_molar(comp: &Composition, t_k: f64, p_bar: f64) -> f64 {
    let t_ref = REFERENCE_TEMPERATURE_K;
    let thermal: f64 = comp
        .iter()
        .map(|(species, x)| {
            let [a, b, c] = species.ideal_gas_cp_coeffs();
            x * (a * (t_k / t_ref).ln() + b * (t_k - t_ref) + c / 2.0 * (t_k * t_k - t_ref * t_ref))
        })
        .sum();
    thermal - R_GAS_J_PER_MOL_K * (p_bar / REFERENCE_PRESSURE_BAR).ln()
}

/// Full thermodynamic evaluation result at a (composition, P, T) point, all
/// quantities per mole except where noted.
#[derive(Debug, Clone, Copy)]
pub struct EosPoint {
    pub z: f64,
    pub molar_volume_m3_per_mol: f64,
    pub h_molar_j_per_mol: f64,
    pub s_molar_j_per_mol_k: f64,
    pub cp_molar_j_per_mol_k: f64,
    pub cv_molar_j_per_mol_k: f64,
    pub kappa: f64,
}

fn molar_enthalpy_entropy(
    eos: EosKind,
    comp: &Composition,
    p_pa: f64,
    t_k: f64,
) -> FluidResult<(f64, f64, f64, f64)> {
    let (aalpha, daalpha_dt, b_mix) = mixture_aalpha_b(eos, comp, t_k);
    let r = R_GAS_J_PER_MOL_K;
    let a_dimless = aalpha * p_pa / (r * t_k).powi(2);
    let b_dimless = b_mix * p_pa / (r * t_k);
    let z = select_gas_root(eos, a_dimless, b_dimless)?;

    let (eps, sigma) = eos.eps_sigma();
    let log_term = ((z + sigma * b_dimless) / (z + eps * b_dimless)).ln();
    let h_dep = r * t_k * (z - 1.0)
        + (t_k * daalpha_dt - aalpha) / (b_mix * (sigma - eps)) * log_term;
    let s_dep = r * (z - b_dimless).ln() + daalpha_dt / (b_mix * (sigma - eps)) * log_term;

    let h_ideal = ideal_gas_enthalpy_molar(comp, t_k);
    let s_ideal = ideal_gas_entropy_molar(comp, t_k, p_pa / 1.0e5);

    Ok((z, b_dimless, h_ideal + h_dep, s_ideal + s_dep))
}

/// Evaluate composition + (P [Pa], T [K]) against the cubic EOS, returning
/// Z, molar volume, molar enthalpy/entropy, and heat capacities.
pub fn evaluate(eos: EosKind, comp: &Composition, p_pa: f64, t_k: f64) -> FluidResult<EosPoint> {
    if !p_pa.is_finite() || p_pa <= 0.0 {
        return Err(FluidError::OutOfRange { what: "pressure" });
    }
    if !t_k.is_finite() || t_k <= 0.0 {
        return Err(FluidError::OutOfRange { what: "temperature" });
    }

    let (z, _b_dimless, h_molar, s_molar) = molar_enthalpy_entropy(eos, comp, p_pa, t_k)?;
    let r = R_GAS_J_PER_MOL_K;
    let molar_volume = z * r * t_k / p_pa;

    // cp = (dh/dT)_P via central finite difference; robust and exact by
    // the definition of cp, without deriving the mixture's second
    // T-derivative of aα in closed form.
    let dt = (t_k * 1e-4).max(1e-3);
    let (_, _, h_plus, _) = molar_enthalpy_entropy(eos, comp, p_pa, t_k + dt)?;
    let (_, _, h_minus, _) = molar_enthalpy_entropy(eos, comp, p_pa, t_k - dt)?;
    let cp_molar = (h_plus - h_minus) / (2.0 * dt);

    // Cp - Cv = -T (∂P/∂T)_V^2 / (∂P/∂V)_T, evaluated analytically at the
    // solved molar volume — exact for any EOS, so Cv needs no further
    // curve-fitting.
    let (aalpha, daalpha_dt, b_mix) = mixture_aalpha_b(eos, comp, t_k);
    let (eps, sigma) = eos.eps_sigma();
    let v = molar_volume;
    let dp_dt_v = r / (v - b_mix) - daalpha_dt / ((v + eps * b_mix) * (v + sigma * b_mix));
    let dp_dv_t = -r * t_k / (v - b_mix).powi(2)
        + aalpha * (2.0 * v + (eps + sigma) * b_mix)
            / ((v + eps * b_mix) * (v + sigma * b_mix)).powi(2);

    if dp_dv_t >= 0.0 {
        return Err(FluidError::NonPhysical {
            what: "mechanically unstable EOS root (dP/dV >= 0)",
        });
    }

    let cv_molar = cp_molar + t_k * dp_dt_v * dp_dt_v / dp_dv_t;
    if cp_molar <= 0.0 || cv_molar <= 0.0 {
        return Err(FluidError::NonPhysical {
            what: "non-positive heat capacity",
        });
    }
    let kappa = cp_molar / cv_molar;
    if !(1.0..=2.0).contains(&kappa) {
        return Err(FluidError::NonPhysical {
            what: "heat capacity ratio out of physical range",
        });
    }

    Ok(EosPoint {
        z,
        molar_volume_m3_per_mol: molar_volume,
        h_molar_j_per_mol: h_molar,
        s_molar_j_per_mol_k: s_molar,
        cp_molar_j_per_mol_k: cp_molar,
        cv_molar_j_per_mol_k: cv_molar,
        kappa,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;

    #[test]
    fn pure_methane_z_near_ideal_at_low_pressure() {
        let comp = Composition::pure_methane();
        let point = evaluate(EosKind::Srk, &comp, 1.0e5, 288.15).unwrap();
        assert!((point.z - 1.0).abs() < 0.01);
    }

    #[test]
    fn z_within_dry_gas_range_at_elevated_pressure() {
        let comp = Composition::pure_methane();
        let point = evaluate(EosKind::Pr, &comp, 80.0e5, 320.0).unwrap();
        assert!(point.z >= 0.2 && point.z <= 1.5);
        assert!(point.kappa > 1.0 && point.kappa < 2.0);
    }

    #[test]
    fn ideal_gas_cp_increases_with_temperature_for_methane() {
        let comp = Composition::pure_methane();
        let cp_low = ideal_gas_cp_molar(&comp, 250.0);
        let cp_high = ideal_gas_cp_molar(&comp, 500.0);
        assert!(cp_high > cp_low);
    }

    #[test]
    fn mixture_with_co2_and_nitrogen_converges() {
        use crate::species::Species;
        let comp = Composition::new_mole_fractions(vec![
            (Species::Methane, 0.85),
            (Species::CO2, 0.10),
            (Species::Nitrogen, 0.05),
        ])
        .unwrap();
        let point = evaluate(EosKind::Srk, &comp, 50.0e5, 300.0).unwrap();
        assert!(point.z > 0.0);
    }

    #[test]
    fn cubic_solver_recovers_known_ideal_gas_root() {
        // A=0, B=0 SRK cubic reduces to Z^3 - Z^2 = 0, gas root Z = 1.
        let z = select_gas_root(EosKind::Srk, 0.0, 0.0).unwrap();
        assert!((z - 1.0).abs() < 1e-9);
    }
}
