//! [H+] from a pair of known carbonate parameters.
//!
//! Pairs involving total alkalinity have no algebraic inverse because borate
//! and water alkalinity depend on [H+] as well; they go through
//! [`solve_ph`](crate::speciation::zero::solve_ph). The remaining pairs are
//! exact inverses wrapped as [`HSolution::closed_form`] with the
//! back-substituted residual.
//!
//! Inputs that must be positive (concentrations, TA, BT) are checked here;
//! a violation yields an `InvalidDomain` solution, never a clamped value.

use std::f64::consts::LN_10;

use tracing::debug;

use crate::chemistry::carbon::{
    self, dic_from_co2_h, dic_from_co3_h, dic_from_hco3_h, noncarbonate_alkalinity,
};
use crate::chemistry::h_from_ph;
use crate::models::{Assumptions, EquilibriumConstants};
use crate::speciation::zero::{HSolution, SolverConfig, find_root, solve_ph};

fn positive(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite() && *v > 0.0)
}

/// Borate and water alkalinity with its derivative in h.
fn noncarbonate(h: f64, bt: f64, ks: &EquilibriumConstants, unit: f64) -> (f64, f64) {
    let kb_h = ks.kb + h;
    let value = noncarbonate_alkalinity(h, bt, ks, unit);
    let slope = -bt * ks.kb / (kb_h * kb_h) - (ks.kw / (h * h) + 1.0) * unit;
    (value, slope)
}

/// Predicted alkalinity at fixed DIC, with its derivative in h.
fn alkalinity_at_dic(
    h: f64,
    dic: f64,
    bt: f64,
    ks: &EquilibriumConstants,
    unit: f64,
) -> (f64, f64) {
    let num = ks.k1 * h + 2.0 * ks.k1 * ks.k2;
    let den = h * h + ks.k1 * h + ks.k1 * ks.k2;
    let (w, dw) = noncarbonate(h, bt, ks, unit);
    let carb = dic * num / den;
    let dcarb = dic * (ks.k1 * den - num * (2.0 * h + ks.k1)) / (den * den);
    (carb + w, dcarb + dw)
}

/// Residual of the TA–DIC pair at [H+] `h`: predicted minus known alkalinity.
///
/// Strictly decreasing in `h` for positive DIC and BT.
pub fn ta_dic_residual(
    h: f64,
    ta: f64,
    dic: f64,
    bt: f64,
    ks: &EquilibriumConstants,
    unit: f64,
) -> f64 {
    alkalinity_at_dic(h, dic, bt, ks, unit).0 - ta
}

/// Lifts an alkalinity model `h -> (TA, dTA/dh)` to a zero function in pH.
fn zero_in_ph<A>(alkalinity: A, ta: f64) -> impl Fn(f64) -> (f64, f64)
where
    A: Fn(f64) -> (f64, f64),
{
    move |ph| {
        let h = h_from_ph(ph);
        let (value, slope) = alkalinity(h);
        (value - ta, -LN_10 * h * slope)
    }
}

fn solve_alkalinity<A>(alkalinity: A, ta: f64, ph_hi: f64, cfg: &SolverConfig) -> HSolution
where
    A: Fn(f64) -> (f64, f64),
{
    let sol = solve_ph(zero_in_ph(alkalinity, ta), cfg.ph_lo, ph_hi, ta, cfg);
    if !sol.converged() {
        debug!(
            status = ?sol.diag.status,
            iterations = sol.diag.iterations,
            residual = sol.diag.residual,
            ta,
            "alkalinity root search failed"
        );
    }
    sol
}

pub fn h_from_ta_dic(
    ta: f64,
    dic: f64,
    bt: f64,
    ks: &EquilibriumConstants,
    ass: &Assumptions,
) -> HSolution {
    if !positive(&[ta, dic, bt]) {
        return HSolution::invalid();
    }
    let alk = |h| alkalinity_at_dic(h, dic, bt, ks, ass.unit);
    solve_alkalinity(alk, ta, ass.solver.ph_hi, &ass.solver)
}

pub fn h_from_co2_ta(
    co2: f64,
    ta: f64,
    bt: f64,
    ks: &EquilibriumConstants,
    ass: &Assumptions,
) -> HSolution {
    if !positive(&[co2, ta, bt]) {
        return HSolution::invalid();
    }
    let alk = |h: f64| {
        let (w, dw) = noncarbonate(h, bt, ks, ass.unit);
        let h2 = h * h;
        let carb = co2 * (ks.k1 / h + 2.0 * ks.k1 * ks.k2 / h2);
        let dcarb = -co2 * (ks.k1 / h2 + 4.0 * ks.k1 * ks.k2 / (h2 * h));
        (carb + w, dcarb + dw)
    };
    solve_alkalinity(alk, ta, ass.solver.ph_hi, &ass.solver)
}

pub fn h_from_hco3_ta(
    hco3: f64,
    ta: f64,
    bt: f64,
    ks: &EquilibriumConstants,
    ass: &Assumptions,
) -> HSolution {
    if !positive(&[hco3, ta, bt]) {
        return HSolution::invalid();
    }
    let alk = |h: f64| {
        let (w, dw) = noncarbonate(h, bt, ks, ass.unit);
        let carb = hco3 * (1.0 + 2.0 * ks.k2 / h);
        let dcarb = -2.0 * hco3 * ks.k2 / (h * h);
        (carb + w, dcarb + dw)
    };
    solve_alkalinity(alk, ta, ass.solver.ph_hi, &ass.solver)
}

/// [H+] from CO3 and TA.
///
/// With CO3 fixed, HCO3 = CO3·h/K2 grows with h while the borate and water
/// terms shrink, so predicted alkalinity has a single minimum and usually
/// two roots. The minimum is located first and the acidic branch below it
/// is searched, which is the carbonate-dominated solution. The solution is
/// flagged ambiguous when the alkaline branch also crosses TA inside the
/// bracket. Both searches draw on one `max_iter` budget.
pub fn h_from_co3_ta(
    co3: f64,
    ta: f64,
    bt: f64,
    ks: &EquilibriumConstants,
    ass: &Assumptions,
) -> HSolution {
    if !positive(&[co3, ta, bt]) {
        return HSolution::invalid();
    }
    let cfg = &ass.solver;
    let unit = ass.unit;
    let alk = |h: f64| {
        let (w, dw) = noncarbonate(h, bt, ks, unit);
        (co3 * (h / ks.k2 + 2.0) + w, co3 / ks.k2 + dw)
    };
    // dTA/dh and its derivative, both as functions of pH.
    let slope = |ph: f64| {
        let h = h_from_ph(ph);
        let (_, dw) = noncarbonate(h, bt, ks, unit);
        let kb_h = ks.kb + h;
        let curvature =
            2.0 * bt * ks.kb / (kb_h * kb_h * kb_h) + 2.0 * ks.kw * unit / (h * h * h);
        (co3 / ks.k2 + dw, -LN_10 * h * curvature)
    };
    let (ph_min, min_diag) = find_root(slope, cfg.ph_lo, cfg.ph_hi, co3 / ks.k2, cfg);
    let found_min = min_diag.converged();
    let ph_hi = if found_min { ph_min } else { cfg.ph_hi };

    let remaining = SolverConfig {
        max_iter: cfg.max_iter.saturating_sub(min_diag.iterations),
        ..*cfg
    };
    let mut sol = solve_alkalinity(alk, ta, ph_hi, &remaining);
    sol.diag.iterations += min_diag.iterations;
    let alkaline_root = found_min && alk(h_from_ph(cfg.ph_hi)).0 > ta;
    sol.flag_ambiguous(alkaline_root)
}

pub fn h_from_co2_dic(co2: f64, dic: f64, ks: &EquilibriumConstants) -> HSolution {
    if !positive(&[co2, dic]) {
        return HSolution::invalid();
    }
    let h = carbon::h_from_co2_dic(co2, dic, ks);
    HSolution::closed_form(h, dic_from_co2_h(co2, h, ks) - dic)
}

/// [H+] from HCO3 and DIC: the alkaline root, flagged ambiguous when its
/// acidic partner K1·K2/h also lies inside the pH bracket.
pub fn h_from_hco3_dic(
    hco3: f64,
    dic: f64,
    ks: &EquilibriumConstants,
    ass: &Assumptions,
) -> HSolution {
    if !positive(&[hco3, dic]) {
        return HSolution::invalid();
    }
    let h = carbon::h_from_hco3_dic(hco3, dic, ks);
    let acidic = ks.k1 * ks.k2 / h;
    HSolution::closed_form(h, dic_from_hco3_h(hco3, h, ks) - dic)
        .flag_ambiguous(acidic > h && ass.solver.brackets(acidic))
}

pub fn h_from_co3_dic(co3: f64, dic: f64, ks: &EquilibriumConstants) -> HSolution {
    if !positive(&[co3, dic]) {
        return HSolution::invalid();
    }
    let h = carbon::h_from_co3_dic(co3, dic, ks);
    HSolution::closed_form(h, dic_from_co3_h(co3, h, ks) - dic)
}

pub fn h_from_co2_hco3(co2: f64, hco3: f64, ks: &EquilibriumConstants) -> HSolution {
    if !positive(&[co2, hco3]) {
        return HSolution::invalid();
    }
    let h = carbon::h_from_co2_hco3(co2, hco3, ks);
    HSolution::closed_form(h, co2 * ks.k1 / h - hco3)
}

pub fn h_from_co2_co3(co2: f64, co3: f64, ks: &EquilibriumConstants) -> HSolution {
    if !positive(&[co2, co3]) {
        return HSolution::invalid();
    }
    let h = carbon::h_from_co2_co3(co2, co3, ks);
    HSolution::closed_form(h, co2 * ks.k1 * ks.k2 / (h * h) - co3)
}

pub fn h_from_hco3_co3(hco3: f64, co3: f64, ks: &EquilibriumConstants) -> HSolution {
    if !positive(&[hco3, co3]) {
        return HSolution::invalid();
    }
    let h = carbon::h_from_hco3_co3(hco3, co3, ks);
    HSolution::closed_form(h, hco3 * ks.k2 / h - co3)
}
