//! Boron isotope layer: the full abundance/δ¹¹B set of a solved row.

use serde::{Deserialize, Serialize};

use crate::chemistry::isotopes::{
    a11_from_d11, abo3_from_abo4, abo3_from_abt_h, abo4_from_abo3, abo4_from_abt_h,
    abt_from_abo3_h, abt_from_abo4_h, d11_from_a11, h_from_abt_abo4,
};
use crate::error::{AppError, ElementFault};
use crate::models::{EquilibriumConstants, Inputs, Series};
use crate::speciation::zero::HSolution;

/// The single isotope quantity a row is anchored on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsotopeInput {
    #[serde(rename = "ABT")]
    Abt,
    #[serde(rename = "ABO3")]
    Abo3,
    #[serde(rename = "ABO4")]
    Abo4,
    #[serde(rename = "dBT")]
    Dbt,
    #[serde(rename = "dBO3")]
    Dbo3,
    #[serde(rename = "dBO4")]
    Dbo4,
}

impl IsotopeInput {
    const ALL: [IsotopeInput; 6] = [
        IsotopeInput::Abt,
        IsotopeInput::Abo3,
        IsotopeInput::Abo4,
        IsotopeInput::Dbt,
        IsotopeInput::Dbo3,
        IsotopeInput::Dbo4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IsotopeInput::Abt => "ABT",
            IsotopeInput::Abo3 => "ABO3",
            IsotopeInput::Abo4 => "ABO4",
            IsotopeInput::Dbt => "dBT",
            IsotopeInput::Dbo3 => "dBO3",
            IsotopeInput::Dbo4 => "dBO4",
        }
    }

    pub fn series(self, inputs: &Inputs) -> Option<&Series> {
        match self {
            IsotopeInput::Abt => inputs.abt.as_ref(),
            IsotopeInput::Abo3 => inputs.abo3.as_ref(),
            IsotopeInput::Abo4 => inputs.abo4.as_ref(),
            IsotopeInput::Dbt => inputs.dbt.as_ref(),
            IsotopeInput::Dbo3 => inputs.dbo3.as_ref(),
            IsotopeInput::Dbo4 => inputs.dbo4.as_ref(),
        }
    }
}

/// The isotope input present in `inputs`, if any. At most one is allowed.
pub fn isotope_input(inputs: &Inputs) -> Result<Option<IsotopeInput>, AppError> {
    let present: Vec<IsotopeInput> = IsotopeInput::ALL
        .into_iter()
        .filter(|i| i.series(inputs).is_some())
        .collect();
    match present.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        many => Err(AppError::OverdeterminedIsotopes {
            supplied: many.iter().map(|i| i.as_str()).collect(),
        }),
    }
}

/// Abundances and δ¹¹B of total boron, boric acid and borate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsotopeSet {
    #[serde(rename = "alphaB")]
    pub alpha_b: f64,
    #[serde(rename = "ABT")]
    pub abt: f64,
    #[serde(rename = "ABO3")]
    pub abo3: f64,
    #[serde(rename = "ABO4")]
    pub abo4: f64,
    #[serde(rename = "dBT")]
    pub dbt: f64,
    #[serde(rename = "dBO3")]
    pub dbo3: f64,
    #[serde(rename = "dBO4")]
    pub dbo4: f64,
    /// Set when the anchor value admits no abundance in (0, 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<ElementFault>,
}

impl IsotopeSet {
    /// Placeholder for rows whose [H+] could not be solved.
    pub fn undefined(alpha_b: f64) -> Self {
        Self {
            alpha_b,
            abt: f64::NAN,
            abo3: f64::NAN,
            abo4: f64::NAN,
            dbt: f64::NAN,
            dbo3: f64::NAN,
            dbo4: f64::NAN,
            fault: None,
        }
    }

    fn invalid(alpha_b: f64) -> Self {
        Self {
            fault: Some(ElementFault::InvalidDomainValue),
            ..Self::undefined(alpha_b)
        }
    }
}

fn in_unit(a: f64) -> bool {
    a.is_finite() && a > 0.0 && a < 1.0
}

/// Completes the isotope set at [H+] `h` from one known quantity.
///
/// An anchor outside (0, 1) as an abundance, or a non-positive `alpha_b`,
/// yields a `NaN` set carrying `InvalidDomainValue`.
pub fn isotope_set(
    h: f64,
    ks: &EquilibriumConstants,
    input: IsotopeInput,
    value: f64,
    alpha_b: f64,
    r_std: f64,
) -> IsotopeSet {
    let a = match input {
        IsotopeInput::Dbt | IsotopeInput::Dbo3 | IsotopeInput::Dbo4 => a11_from_d11(value, r_std),
        _ => value,
    };
    if !(in_unit(a) && alpha_b.is_finite() && alpha_b > 0.0) {
        return IsotopeSet::invalid(alpha_b);
    }
    let (abt, abo3, abo4) = match input {
        IsotopeInput::Abt | IsotopeInput::Dbt => (
            a,
            abo3_from_abt_h(h, a, ks, alpha_b),
            abo4_from_abt_h(h, a, ks, alpha_b),
        ),
        IsotopeInput::Abo3 | IsotopeInput::Dbo3 => (
            abt_from_abo3_h(h, a, ks, alpha_b),
            a,
            abo4_from_abo3(a, alpha_b),
        ),
        IsotopeInput::Abo4 | IsotopeInput::Dbo4 => (
            abt_from_abo4_h(h, a, ks, alpha_b),
            abo3_from_abo4(a, alpha_b),
            a,
        ),
    };
    if !(in_unit(abt) && in_unit(abo3) && in_unit(abo4)) {
        return IsotopeSet::invalid(alpha_b);
    }
    IsotopeSet {
        alpha_b,
        abt,
        abo3,
        abo4,
        dbt: d11_from_a11(abt, r_std),
        dbo3: d11_from_a11(abo3, r_std),
        dbo4: d11_from_a11(abo4, r_std),
        fault: None,
    }
}

/// [H+] from the total-boron and borate abundances (the δ¹¹B pH proxy).
pub fn h_from_boron_isotopes(
    abt: f64,
    abo4: f64,
    ks: &EquilibriumConstants,
    alpha_b: f64,
) -> HSolution {
    if !(in_unit(abt) && in_unit(abo4) && alpha_b.is_finite() && alpha_b > 0.0) {
        return HSolution::invalid();
    }
    HSolution::closed_form(h_from_abt_abo4(abt, abo4, ks, alpha_b), 0.0)
}
