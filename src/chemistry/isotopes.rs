//! Boron isotope algebra.
//!
//! Abundances `A` are ¹¹B/(¹⁰B + ¹¹B) of a boron pool; δ¹¹B values are per mil
//! relative to a reference ratio `r_std`. The fractionation factor is
//! `alpha_b = R(BO3)/R(BO4)` with `R = A/(1 − A)`.

use crate::chemistry::boron::boric_fraction;
use crate::models::EquilibriumConstants;

/// Boric acid / borate fractionation factor at `t_c` °C.
pub fn alpha_b(t_c: f64) -> f64 {
    1.0293 - 0.000082 * t_c
}

/// δ¹¹B (‰) from fractional abundance.
pub fn d11_from_a11(a11: f64, r_std: f64) -> f64 {
    (a11 / (1.0 - a11) / r_std - 1.0) * 1000.0
}

/// Fractional abundance from δ¹¹B (‰).
pub fn a11_from_d11(d11: f64, r_std: f64) -> f64 {
    let r = r_std * (1.0 + d11 / 1000.0);
    r / (1.0 + r)
}

pub fn abo4_from_abo3(abo3: f64, alpha_b: f64) -> f64 {
    abo3 / (abo3 + alpha_b * (1.0 - abo3))
}

pub fn abo3_from_abo4(abo4: f64, alpha_b: f64) -> f64 {
    alpha_b * abo4 / (1.0 - abo4 + alpha_b * abo4)
}

/// Total-boron abundance from the boric acid abundance at [H+] `h`.
pub fn abt_from_abo3_h(h: f64, abo3: f64, ks: &EquilibriumConstants, alpha_b: f64) -> f64 {
    let chi = boric_fraction(h, ks);
    chi * abo3 + (1.0 - chi) * abo4_from_abo3(abo3, alpha_b)
}

/// Total-boron abundance from the borate abundance at [H+] `h`.
pub fn abt_from_abo4_h(h: f64, abo4: f64, ks: &EquilibriumConstants, alpha_b: f64) -> f64 {
    let chi = boric_fraction(h, ks);
    chi * abo3_from_abo4(abo4, alpha_b) + (1.0 - chi) * abo4
}

/// Boric acid abundance from the total-boron abundance.
///
/// Mass balance gives `chi(1 − α)·x² + (chi·α + 1 − chi − ABT(1 − α))·x − ABT·α = 0`
/// for `x = ABO3`; the root in (0, 1) is taken.
pub fn abo3_from_abt_h(h: f64, abt: f64, ks: &EquilibriumConstants, alpha_b: f64) -> f64 {
    let chi = boric_fraction(h, ks);
    let a = chi * (1.0 - alpha_b);
    let b = chi * alpha_b + 1.0 - chi - abt * (1.0 - alpha_b);
    let c = -abt * alpha_b;
    abundance_root(a, b, c)
}

/// Borate abundance from the total-boron abundance.
pub fn abo4_from_abt_h(h: f64, abt: f64, ks: &EquilibriumConstants, alpha_b: f64) -> f64 {
    let chi = boric_fraction(h, ks);
    let a = (1.0 - chi) * (alpha_b - 1.0);
    let b = chi * alpha_b + 1.0 - chi - abt * (alpha_b - 1.0);
    let c = -abt;
    abundance_root(a, b, c)
}

/// [H+] from the total-boron and borate abundances (the δ¹¹B pH proxy).
pub fn h_from_abt_abo4(abt: f64, abo4: f64, ks: &EquilibriumConstants, alpha_b: f64) -> f64 {
    let abo3 = abo3_from_abo4(abo4, alpha_b);
    let chi = (abt - abo4) / (abo3 - abo4);
    ks.kb * chi / (1.0 - chi)
}

// b > 0 and c < 0 in both mixing quadratics, so 2c/(−b − √disc) is the
// positive root and stays finite when the quadratic term vanishes.
fn abundance_root(a: f64, b: f64, c: f64) -> f64 {
    let disc = b * b - 4.0 * a * c;
    2.0 * c / (-b - disc.sqrt())
}
