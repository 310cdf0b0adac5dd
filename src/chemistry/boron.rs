//! Boric acid B(OH)3 ("BO3") and borate B(OH)4- ("BO4") speciation.

use crate::models::EquilibriumConstants;

/// Fraction of total boron present as boric acid, 1/(1 + KB/h).
pub fn boric_fraction(h: f64, ks: &EquilibriumConstants) -> f64 {
    1.0 / (1.0 + ks.kb / h)
}

pub fn bo4_from_bt_h(bt: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    bt / (1.0 + h / ks.kb)
}

pub fn bo3_from_bt_h(bt: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    bt - bo4_from_bt_h(bt, h, ks)
}

pub fn h_from_bt_bo3(bt: f64, bo3: f64, ks: &EquilibriumConstants) -> f64 {
    ks.kb * bo3 / (bt - bo3)
}

pub fn h_from_bt_bo4(bt: f64, bo4: f64, ks: &EquilibriumConstants) -> f64 {
    ks.kb * (bt - bo4) / bo4
}

pub fn h_from_bo3_bo4(bo3: f64, bo4: f64, ks: &EquilibriumConstants) -> f64 {
    ks.kb * bo3 / bo4
}

pub fn bt_from_bo3_h(bo3: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    bo3 * (1.0 + ks.kb / h)
}

pub fn bt_from_bo4_h(bo4: f64, h: f64, ks: &EquilibriumConstants) -> f64 {
    bo4 * (1.0 + h / ks.kb)
}
