//! Bracketed root finding in pH space.
//!
//! Every parameter pair without a closed-form inverse is reduced to a zero
//! function `f(pH)` returning the residual and its derivative. [`solve_ph`]
//! runs a safeguarded Newton–Raphson iteration on it: Newton steps while they
//! stay inside the current bracket and shrink fast enough, bisection
//! otherwise. The bracket is kept around a sign change at every step, so the
//! iteration cannot wander off and is capped at `max_iter` evaluations.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::chemistry::h_from_ph;
use crate::error::ElementFault;

/// Root-finder settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Acidic end of the pH bracket.
    pub ph_lo: f64,
    /// Alkaline end of the pH bracket.
    pub ph_hi: f64,
    /// Residual tolerance, relative to the magnitude of the target value.
    pub residual_tol: f64,
    /// Smallest pH step considered progress.
    pub ph_tol: f64,
    /// Iteration budget of one solve, shared by every search it runs.
    pub max_iter: u32,
}

impl SolverConfig {
    /// `h` lies inside the pH bracket.
    pub fn brackets(&self, h: f64) -> bool {
        let ph = -h.log10();
        ph >= self.ph_lo && ph <= self.ph_hi
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            ph_lo: 2.0,
            ph_hi: 12.0,
            residual_tol: 1e-10,
            ph_tol: 1e-12,
            max_iter: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Root found within tolerance.
    Converged,
    /// Solved by an exact algebraic inverse; no iteration.
    ClosedForm,
    /// Iteration cap reached before the residual met tolerance.
    MaxIterations,
    /// The residual has the same sign at both ends of the bracket.
    NoSignChange,
    /// The pH step collapsed while the residual was still above tolerance.
    Stalled,
    /// Non-positive or non-finite input where a positive value is required.
    InvalidDomain,
}

impl SolveStatus {
    pub fn fault(self) -> Option<ElementFault> {
        match self {
            SolveStatus::Converged | SolveStatus::ClosedForm => None,
            SolveStatus::MaxIterations | SolveStatus::NoSignChange | SolveStatus::Stalled => {
                Some(ElementFault::NonConvergence)
            }
            SolveStatus::InvalidDomain => Some(ElementFault::InvalidDomainValue),
        }
    }
}

/// Outcome of one [H+] solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub status: SolveStatus,
    pub iterations: u32,
    /// Final residual in the units of the target quantity.
    pub residual: f64,
    /// A second root lies inside the bracket; the documented branch was kept.
    #[serde(default)]
    pub ambiguous: bool,
}

impl Diagnostic {
    pub fn converged(&self) -> bool {
        self.status.fault().is_none()
    }

    pub fn fault(&self) -> Option<ElementFault> {
        self.status.fault()
    }
}

/// Solved [H+] (mol/kg) with its diagnostic. `h` is `NaN` unless converged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HSolution {
    pub h: f64,
    pub diag: Diagnostic,
}

impl HSolution {
    pub fn invalid() -> Self {
        Self::failed(SolveStatus::InvalidDomain, 0, f64::NAN)
    }

    fn failed(status: SolveStatus, iterations: u32, residual: f64) -> Self {
        Self {
            h: f64::NAN,
            diag: Diagnostic {
                status,
                iterations,
                residual,
                ambiguous: false,
            },
        }
    }

    /// Wraps an exact inverse. A non-positive or non-finite `h` means the
    /// inputs admit no physical solution.
    pub fn closed_form(h: f64, residual: f64) -> Self {
        if !(h.is_finite() && h > 0.0) {
            return Self::invalid();
        }
        Self {
            h,
            diag: Diagnostic {
                status: SolveStatus::ClosedForm,
                iterations: 0,
                residual,
                ambiguous: false,
            },
        }
    }

    pub fn converged(&self) -> bool {
        self.diag.converged()
    }

    /// Marks a converged solution whose rejected alternative root is admissible.
    pub(crate) fn flag_ambiguous(mut self, alternative_in_bracket: bool) -> Self {
        self.diag.ambiguous = self.converged() && alternative_in_bracket;
        self
    }
}

/// Finds the pH in `[lo, hi]` where `zero` vanishes and returns it as [H+].
///
/// `zero(pH)` returns `(f, df/dpH)`. `scale` is the magnitude the residual
/// tolerance is relative to (usually the known total alkalinity).
pub fn solve_ph<F>(zero: F, lo: f64, hi: f64, scale: f64, cfg: &SolverConfig) -> HSolution
where
    F: Fn(f64) -> (f64, f64),
{
    let (ph, diag) = find_root(zero, lo, hi, scale, cfg);
    HSolution {
        h: h_from_ph(ph),
        diag,
    }
}

/// Same as [`solve_ph`] but returns the root in pH rather than [H+].
pub(crate) fn find_root<F>(
    zero: F,
    lo: f64,
    hi: f64,
    scale: f64,
    cfg: &SolverConfig,
) -> (f64, Diagnostic)
where
    F: Fn(f64) -> (f64, f64),
{
    let ftol = cfg.residual_tol * scale.abs().max(f64::MIN_POSITIVE);
    let fail = |status, iterations, residual| {
        (
            f64::NAN,
            Diagnostic {
                status,
                iterations,
                residual,
                ambiguous: false,
            },
        )
    };
    let done = |x: f64, iterations, residual: f64| {
        let status = if residual.abs() <= ftol {
            SolveStatus::Converged
        } else {
            SolveStatus::Stalled
        };
        let x = if status == SolveStatus::Converged { x } else { f64::NAN };
        (
            x,
            Diagnostic {
                status,
                iterations,
                residual,
                ambiguous: false,
            },
        )
    };

    let (f_lo, _) = zero(lo);
    let (f_hi, _) = zero(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) {
        return fail(SolveStatus::InvalidDomain, 0, f64::NAN);
    }
    if f_lo == 0.0 {
        return done(lo, 0, 0.0);
    }
    if f_hi == 0.0 {
        return done(hi, 0, 0.0);
    }
    if f_lo.signum() == f_hi.signum() {
        return fail(SolveStatus::NoSignChange, 0, f_lo.abs().min(f_hi.abs()));
    }

    // Orient so that f(xl) < 0 < f(xh).
    let (mut xl, mut xh) = if f_lo < 0.0 { (lo, hi) } else { (hi, lo) };
    let mut x = 0.5 * (lo + hi);
    let mut dx_old = (hi - lo).abs();
    let mut dx = dx_old;
    let (mut f, mut df) = zero(x);

    for iter in 1..=cfg.max_iter {
        if !f.is_finite() {
            return fail(SolveStatus::InvalidDomain, iter, f);
        }
        if f.abs() <= ftol {
            return done(x, iter, f);
        }

        let newton_leaves_bracket = ((x - xh) * df - f) * ((x - xl) * df - f) > 0.0;
        let newton_too_slow = (2.0 * f).abs() > (dx_old * df).abs();
        if newton_leaves_bracket || newton_too_slow || df == 0.0 {
            dx_old = dx;
            dx = 0.5 * (xh - xl);
            x = xl + dx;
        } else {
            dx_old = dx;
            dx = f / df;
            x -= dx;
        }
        trace!(iter, ph = x, residual = f, "pH iteration");

        (f, df) = zero(x);
        if dx.abs() < cfg.ph_tol {
            return done(x, iter, f);
        }
        if f < 0.0 {
            xl = x;
        } else {
            xh = x;
        }
    }

    if f.abs() <= ftol {
        return done(x, cfg.max_iter, f);
    }
    fail(SolveStatus::MaxIterations, cfg.max_iter, f)
}
