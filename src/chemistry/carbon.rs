//! Carbonate system closed forms.
//!
//! `h` is [H+] in mol/kg. Carbon species share whatever unit the caller uses;
//! only the water terms of alkalinity need the `unit` factor.

use crate::chemistry::{KELVIN, P_ATM_BAR, R_GAS, stable_root};
use crate::models::EquilibriumConstants;

/// 1 + K1/h + K1·K2/h², the DIC/CO2 ratio.
fn co2_denominator(h: f64, ks: &EquilibriumConstants) -> f64 {
    1.0 + ks.k1 / h + ks.k1 * ks.k2 / (h * h)
}

pub fn dic_from_co2_h(co2: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    co2 * co2_denominator(h, ks)
}

pub fn dic_from_hco3_h(hco3: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    hco3 * (h / ks.k1 + 1.0 + ks.k2 / h)
}

pub fn dic_from_co3_h(co3: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    co3 * (h * h / (ks.k1 * ks.k2) + h / ks.k2 + 1.0)
}

pub fn co2_from_dic_h(dic: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    dic / co2_denominator(h, ks)
}

pub fn hco3_from_dic_h(dic: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    co2_from_dic_h(dic, h, ks) * ks.k1 / h
}

pub fn co3_from_dic_h(dic: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    hco3_from_dic_h(dic, h, ks) * ks.k2 / h
}

/// Borate plus water alkalinity, BT·KB/(KB + h) + (KW/h − h)·unit.
pub fn noncarbonate_alkalinity(h: f64, bt: f64, ks: &EquilibriumConstants, unit: f64) -> f64 {
    bt * ks.kb / (ks.kb + h) + (ks.kw / h - h) * unit
}

/// Total alkalinity from CO2 and [H+]:
/// TA = HCO3 + 2·CO3 + BO4 + (KW/h − h)·unit.
pub fn ta_from_co2_h(co2: f64, h: f64, bt: f64, ks: &EquilibriumConstants, unit: f64) -> f64 {
    co2 * (ks.k1 / h + 2.0 * ks.k1 * ks.k2 / (h * h)) + noncarbonate_alkalinity(h, bt, ks, unit)
}

/// CO2 from total alkalinity and [H+]; the inverse of [`ta_from_co2_h`].
pub fn co2_from_ta_h(ta: f64, h: f64, bt: f64, ks: &EquilibriumConstants, unit: f64) -> f64 {
    (ta - noncarbonate_alkalinity(h, bt, ks, unit)) / (ks.k1 / h + 2.0 * ks.k1 * ks.k2 / (h * h))
}

pub fn fco2_from_co2(co2: f64, ks: &EquilibriumConstants) -> f64 {
    co2 / ks.k0
}

pub fn co2_from_fco2(fco2: f64, ks: &EquilibriumConstants) -> f64 {
    fco2 * ks.k0
}

/// fCO2/pCO2 at one atmosphere total pressure (Weiss 1974 virial form).
///
/// Depends on temperature only; the mole-fraction term of the cross virial
/// coefficient is taken as 1.
pub fn fugacity_factor(t_c: f64) -> f64 {
    let tk = t_c + KELVIN;
    let b = -1636.75 + tk * (12.0408 + tk * (-0.032_795_7 + tk * 3.165_28e-5));
    let delta = 57.7 - 0.118 * tk;
    (P_ATM_BAR * (b + 2.0 * delta) / (R_GAS * tk)).exp()
}

pub fn pco2_from_fco2(fco2: f64, t_c: f64) -> f64 {
    fco2 / fugacity_factor(t_c)
}

pub fn fco2_from_pco2(pco2: f64, t_c: f64) -> f64 {
    pco2 * fugacity_factor(t_c)
}

/// [H+] from CO2 and HCO3: h = K1·CO2/HCO3.
pub fn h_from_co2_hco3(co2: f64, hco3: f64, ks: &EquilibriumConstants) -> f64 {
    ks.k1 * co2 / hco3
}

/// [H+] from CO2 and CO3: h² = K1·K2·CO2/CO3.
pub fn h_from_co2_co3(co2: f64, co3: f64, ks: &EquilibriumConstants) -> f64 {
    (ks.k1 * ks.k2 * co2 / co3).sqrt()
}

/// [H+] from HCO3 and CO3: h = K2·HCO3/CO3.
pub fn h_from_hco3_co3(hco3: f64, co3: f64, ks: &EquilibriumConstants) -> f64 {
    ks.k2 * hco3 / co3
}

/// [H+] from CO2 and DIC. `NaN` unless DIC > CO2.
pub fn h_from_co2_dic(co2: f64, dic: f64, ks: &EquilibriumConstants) -> f64 {
    // (DIC/CO2 − 1)·h² − K1·h − K1·K2 = 0
    stable_root(dic / co2 - 1.0, -ks.k1, -ks.k1 * ks.k2)
}

/// [H+] from HCO3 and DIC.
///
/// HCO3 peaks at h = √(K1·K2), so any admissible HCO3/DIC ratio is met twice;
/// the alkaline root (h < √(K1·K2)) is returned. `NaN` if HCO3 exceeds the
/// largest fraction of DIC it can reach.
pub fn h_from_hco3_dic(hco3: f64, dic: f64, ks: &EquilibriumConstants) -> f64 {
    // h²/K1 + (1 − DIC/HCO3)·h + K2 = 0
    stable_root(1.0 / ks.k1, 1.0 - dic / hco3, ks.k2)
}

/// [H+] from CO3 and DIC. `NaN` unless DIC > CO3.
pub fn h_from_co3_dic(co3: f64, dic: f64, ks: &EquilibriumConstants) -> f64 {
    // h²/(K1·K2) + h/K2 + (1 − DIC/CO3) = 0
    stable_root(1.0 / (ks.k1 * ks.k2), 1.0 / ks.k2, 1.0 - dic / co3)
}
