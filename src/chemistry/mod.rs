//! Chemistry module: constants and closed-form relations of the seawater
//! carbonate and boron systems.
//!
//! This module provides:
//! - pH / [H+] conversion
//! - Carbonate speciation from [H+] and one known quantity (`carbon`)
//! - Boric acid / borate speciation and its inversions (`boron`)
//! - Boron isotope algebra: fractionation, abundance ↔ δ¹¹B (`isotopes`)
//!
//! Units conventions:
//! - [H+] and equilibrium constants are always mol/kg
//! - Carbon and boron species may be in any consistent unit; functions that mix
//!   species with [H+]/KW take a `unit` factor (1 for mol/kg, 1e6 for µmol/kg)
//! - Temperatures are °C
//!
//! Every function is element-wise on `f64` and performs no validation; the
//! speciation layer is responsible for rejecting non-physical rows.
//!
//! # Examples
//! ```rust
//! use carbsys_rs::chemistry::{boron::bo4_from_bt_h, h_from_ph};
//! use carbsys_rs::EquilibriumConstants;
//!
//! let ks = EquilibriumConstants {
//!     k0: 0.0284, k1: 1.42e-6, k2: 1.08e-9, kb: 2.52657299e-9,
//!     kw: 6.06e-14, kso4: 0.1, kspa: 6.48e-7, kspc: 4.27e-7,
//! };
//! let bo4 = bo4_from_bt_h(433.0, h_from_ph(8.1), &ks);
//! assert!((bo4 - 104.49104305).abs() < 1e-3);
//! ```

pub mod boron;
pub mod carbon;
pub mod isotopes;

/// ¹¹B/¹⁰B ratio of NIST SRM-951 boric acid, the δ¹¹B reference.
pub const R_SRM951: f64 = 4.04367;
/// Reference practical salinity for composition scaling.
pub const REF_SALINITY: f64 = 35.0;
/// Total boron at S = 35 (Uppström 1974), mol/kg.
pub const UPPSTROM_BT_MOL_KG: f64 = 0.000_415_7;
/// Calcium at S = 35, mol/kg.
pub const REF_CA_MOL_KG: f64 = 0.010_282_1;

pub const KELVIN: f64 = 273.15;
/// Gas constant in cm³·bar/(K·mol).
pub const R_GAS: f64 = 83.144_72;
/// One standard atmosphere in bar.
pub const P_ATM_BAR: f64 = 1.013_25;

/// [H+] (mol/kg) from pH.
pub fn h_from_ph(ph: f64) -> f64 {
    10f64.powf(-ph)
}

/// pH from [H+] (mol/kg).
pub fn ph_from_h(h: f64) -> f64 {
    -h.log10()
}

/// Saturation state Ω = [CO3²⁻][Ca²⁺]/Ksp.
///
/// `co3` is in caller units (divided by `unit` to reach mol/kg), `ca` in mol/kg.
pub fn omega(co3: f64, ca: f64, ksp: f64, unit: f64) -> f64 {
    co3 / unit * ca / ksp
}

/// Smaller positive root of `a·x² + b·x + c = 0` written without the
/// cancellation of the textbook form. Returns `NaN` when there is no real root.
pub(crate) fn stable_root(a: f64, b: f64, c: f64) -> f64 {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return f64::NAN;
    }
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let r1 = q / a;
    let r2 = c / q;
    let admissible = |r: f64| r.is_finite() && r > 0.0;
    match (admissible(r1), admissible(r2)) {
        (true, true) => r1.min(r2),
        (true, false) => r1,
        (false, true) => r2,
        (false, false) => f64::NAN,
    }
}
