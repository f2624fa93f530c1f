use crate::EcError;

/// Floating point type used throughout the engine.
pub type Real = f64;

/// One tolerance pair for everything.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, EcError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EcError::NonFinite { what, value: v })
    }
}

/// Brent's method configuration. Defaults match the pressure/rate
/// tolerances used throughout the train solver (`spec.md` §4.E Convergence).
#[derive(Clone, Copy, Debug)]
pub struct BrentConfig {
    pub abs_tol: Real,
    pub rel_tol: Real,
    pub max_iterations: usize,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1e-4,
            rel_tol: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Outcome of a Brent root-find.
#[derive(Clone, Copy, Debug)]
pub struct BrentResult {
    pub root: Real,
    pub value: Real,
    pub iterations: usize,
    pub converged: bool,
}

/// Find a root of `f` bracketed by `[lo, hi]` using Brent's method.
///
/// `f(lo)` and `f(hi)` must have opposite signs (or one of them must
/// already be within tolerance of zero). Returns `DidNotConverge` if the
/// bracket is invalid or the iteration budget is exhausted.
pub fn brent_find_root<F>(
    lo: Real,
    hi: Real,
    f: F,
    config: BrentConfig,
) -> Result<BrentResult, EcError>
where
    F: Fn(Real) -> Real,
{
    let mut fa = f(lo);
    let mut fb = f(hi);

    if fa.abs() <= config.abs_tol {
        return Ok(BrentResult {
            root: lo,
            value: fa,
            iterations: 0,
            converged: true,
        });
    }
    if fb.abs() <= config.abs_tol {
        return Ok(BrentResult {
            root: hi,
            value: fb,
            iterations: 0,
            converged: true,
        });
    }
    if fa.signum() == fb.signum() {
        return Err(EcError::DidNotConverge {
            what: "brent bracket does not straddle a root",
        });
    }

    let (mut a, mut b) = (lo, hi);
    // Ensure |f(a)| >= |f(b)|: b is always the best estimate so far.
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut mflag = true;

    for iter in 1..=config.max_iterations {
        if fb.abs() <= config.abs_tol || (b - a).abs() <= config.rel_tol * b.abs().max(1.0) {
            return Ok(BrentResult {
                root: b,
                value: fb,
                iterations: iter,
                converged: true,
            });
        }

        let s = if fa != fc && fb != fc {
            // Inverse quadratic interpolation.
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            // Secant method.
            b - fb * (b - a) / (fb - fa)
        };

        let bounds_ok = {
            let lo_bound = (3.0 * a + b) / 4.0;
            let (min_b, max_b) = if lo_bound < b {
                (lo_bound, b)
            } else {
                (b, lo_bound)
            };
            s >= min_b && s <= max_b
        };
        let step_ok = if mflag {
            (s - b).abs() < (b - c).abs() / 2.0
        } else {
            (s - b).abs() < (c - d).abs() / 2.0
        };
        let min_step_ok = if mflag {
            (b - c).abs() > config.rel_tol
        } else {
            (c - d).abs() > config.rel_tol
        };

        let s = if bounds_ok && step_ok && min_step_ok {
            mflag = false;
            s
        } else {
            mflag = true;
            (a + b) / 2.0
        };

        let fs = f(s);
        d = c;
        c = b;
        fc = fb;

        if fa.signum() != fs.signum() {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }

        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
    }

    Err(EcError::DidNotConverge {
        what: "brent exceeded maximum iterations",
    })
}

/// Monotone bisection on a boolean feasibility predicate: find the
/// largest `x` in `[lo, hi]` for which `feasible(x)` is true, assuming
/// `feasible` holds on `[lo, x*]` and fails on `(x*, hi]`.
///
/// Used by the maximum-rate solver (`spec.md` §4.F), whose feasibility
/// function is a full train solve rather than a scalar residual.
pub fn bisect_feasibility<F>(
    lo: Real,
    hi: Real,
    feasible: F,
    rel_tol: Real,
    max_iterations: usize,
) -> Real
where
    F: Fn(Real) -> bool,
{
    let (mut lo, mut hi) = (lo, hi);
    if !feasible(lo) {
        return lo;
    }
    if feasible(hi) {
        return hi;
    }
    for _ in 0..max_iterations {
        if (hi - lo).abs() <= rel_tol * hi.abs().max(1.0) {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if feasible(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
