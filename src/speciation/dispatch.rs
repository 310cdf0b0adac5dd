//! Solver selection by canonical parameter pair.
//!
//! Each supported pair of carbonate parameters maps to one
//! [`SolverDescriptor`]. Pairs are stored in canonical order (the declaration
//! order of [`Parameter`]), so lookup is independent of the order in which
//! the caller supplied them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chemistry::carbon::{co2_from_fco2, fco2_from_pco2};
use crate::chemistry::h_from_ph;
use crate::error::AppError;
use crate::models::{Assumptions, EquilibriumConstants, Inputs, Series};
use crate::speciation::pairs;
use crate::speciation::zero::HSolution;

/// Carbonate system parameter. Declaration order is the canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "HCO3")]
    Hco3,
    #[serde(rename = "CO3")]
    Co3,
    #[serde(rename = "TA")]
    Ta,
    #[serde(rename = "DIC")]
    Dic,
    #[serde(rename = "fCO2")]
    Fco2,
    #[serde(rename = "pCO2")]
    Pco2,
}

impl Parameter {
    pub const ALL: [Parameter; 8] = [
        Parameter::Ph,
        Parameter::Co2,
        Parameter::Hco3,
        Parameter::Co3,
        Parameter::Ta,
        Parameter::Dic,
        Parameter::Fco2,
        Parameter::Pco2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Co2 => "CO2",
            Parameter::Hco3 => "HCO3",
            Parameter::Co3 => "CO3",
            Parameter::Ta => "TA",
            Parameter::Dic => "DIC",
            Parameter::Fco2 => "fCO2",
            Parameter::Pco2 => "pCO2",
        }
    }

    /// Series supplied for this parameter, if any.
    pub fn series(self, inputs: &Inputs) -> Option<&Series> {
        match self {
            Parameter::Ph => inputs.ph.as_ref(),
            Parameter::Co2 => inputs.co2.as_ref(),
            Parameter::Hco3 => inputs.hco3.as_ref(),
            Parameter::Co3 => inputs.co3.as_ref(),
            Parameter::Ta => inputs.ta.as_ref(),
            Parameter::Dic => inputs.dic.as_ref(),
            Parameter::Fco2 => inputs.fco2.as_ref(),
            Parameter::Pco2 => inputs.pco2.as_ref(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two distinct parameters in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterPair(Parameter, Parameter);

impl ParameterPair {
    pub fn new(a: Parameter, b: Parameter) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> Parameter {
        self.0
    }

    pub fn second(&self) -> Parameter {
        self.1
    }

    pub fn contains(&self, p: Parameter) -> bool {
        self.0 == p || self.1 == p
    }
}

impl fmt::Display for ParameterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.0, self.1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    ClosedForm,
    RootFinding,
}

/// Known values of one row. Absent parameters are `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Knowns {
    pub ph: Option<f64>,
    pub co2: Option<f64>,
    pub hco3: Option<f64>,
    pub co3: Option<f64>,
    pub ta: Option<f64>,
    pub dic: Option<f64>,
    pub fco2: Option<f64>,
    pub pco2: Option<f64>,
    pub bt: f64,
    pub t_c: f64,
}

impl Knowns {
    pub fn at(inputs: &Inputs, i: usize, unit: f64) -> Self {
        let get = |p: Parameter| p.series(inputs).map(|s| s.at(i));
        Self {
            ph: get(Parameter::Ph),
            co2: get(Parameter::Co2),
            hco3: get(Parameter::Hco3),
            co3: get(Parameter::Co3),
            ta: get(Parameter::Ta),
            dic: get(Parameter::Dic),
            fco2: get(Parameter::Fco2),
            pco2: get(Parameter::Pco2),
            bt: inputs.total_boron(i, unit),
            t_c: inputs.temperature(i),
        }
    }

    pub fn get(&self, p: Parameter) -> Option<f64> {
        match p {
            Parameter::Ph => self.ph,
            Parameter::Co2 => self.co2,
            Parameter::Hco3 => self.hco3,
            Parameter::Co3 => self.co3,
            Parameter::Ta => self.ta,
            Parameter::Dic => self.dic,
            Parameter::Fco2 => self.fco2,
            Parameter::Pco2 => self.pco2,
        }
    }

    /// Value of `p`, `NaN` when absent so that solvers flag the row.
    fn value(&self, p: Parameter) -> f64 {
        self.get(p).unwrap_or(f64::NAN)
    }

    /// CO2 given directly or through its fugacity or partial pressure.
    pub fn co2_equivalent(&self, ks: &EquilibriumConstants) -> Option<f64> {
        self.co2
            .or_else(|| self.fco2.map(|f| co2_from_fco2(f, ks)))
            .or_else(|| {
                self.pco2
                    .map(|p| co2_from_fco2(fco2_from_pco2(p, self.t_c), ks))
            })
    }

    fn co2(&self, ks: &EquilibriumConstants) -> f64 {
        self.co2_equivalent(ks).unwrap_or(f64::NAN)
    }

    /// Supplied values of `pair` are physical: pH finite, everything else
    /// (and BT) finite and strictly positive.
    pub fn is_valid(&self, pair: ParameterPair) -> bool {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let ok = |p: Parameter| match (p, self.get(p)) {
            (Parameter::Ph, Some(v)) => v.is_finite(),
            (_, Some(v)) => positive(v),
            (_, None) => false,
        };
        ok(pair.first()) && ok(pair.second()) && positive(self.bt) && self.t_c.is_finite()
    }
}

type SolveFn = fn(&Knowns, &EquilibriumConstants, &Assumptions) -> HSolution;

/// Strategy for one parameter pair.
#[derive(Clone, Copy)]
pub struct SolverDescriptor {
    pub pair: ParameterPair,
    pub kind: SolverKind,
    /// Temperature enters the solve or the back-fill beyond the constants.
    pub needs_temperature: bool,
    pub solve: SolveFn,
}

impl fmt::Debug for SolverDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverDescriptor")
            .field("pair", &self.pair)
            .field("kind", &self.kind)
            .field("needs_temperature", &self.needs_temperature)
            .finish()
    }
}

fn from_ph(k: &Knowns, _: &EquilibriumConstants, _: &Assumptions) -> HSolution {
    HSolution::closed_form(h_from_ph(k.value(Parameter::Ph)), 0.0)
}

fn co2_hco3(k: &Knowns, ks: &EquilibriumConstants, _: &Assumptions) -> HSolution {
    pairs::h_from_co2_hco3(k.co2(ks), k.value(Parameter::Hco3), ks)
}

fn co2_co3(k: &Knowns, ks: &EquilibriumConstants, _: &Assumptions) -> HSolution {
    pairs::h_from_co2_co3(k.co2(ks), k.value(Parameter::Co3), ks)
}

fn co2_ta(k: &Knowns, ks: &EquilibriumConstants, ass: &Assumptions) -> HSolution {
    pairs::h_from_co2_ta(k.co2(ks), k.value(Parameter::Ta), k.bt, ks, ass)
}

fn co2_dic(k: &Knowns, ks: &EquilibriumConstants, _: &Assumptions) -> HSolution {
    pairs::h_from_co2_dic(k.co2(ks), k.value(Parameter::Dic), ks)
}

fn hco3_co3(k: &Knowns, ks: &EquilibriumConstants, _: &Assumptions) -> HSolution {
    pairs::h_from_hco3_co3(k.value(Parameter::Hco3), k.value(Parameter::Co3), ks)
}

fn hco3_ta(k: &Knowns, ks: &EquilibriumConstants, ass: &Assumptions) -> HSolution {
    pairs::h_from_hco3_ta(k.value(Parameter::Hco3), k.value(Parameter::Ta), k.bt, ks, ass)
}

fn hco3_dic(k: &Knowns, ks: &EquilibriumConstants, ass: &Assumptions) -> HSolution {
    pairs::h_from_hco3_dic(k.value(Parameter::Hco3), k.value(Parameter::Dic), ks, ass)
}

fn co3_ta(k: &Knowns, ks: &EquilibriumConstants, ass: &Assumptions) -> HSolution {
    pairs::h_from_co3_ta(k.value(Parameter::Co3), k.value(Parameter::Ta), k.bt, ks, ass)
}

fn co3_dic(k: &Knowns, ks: &EquilibriumConstants, _: &Assumptions) -> HSolution {
    pairs::h_from_co3_dic(k.value(Parameter::Co3), k.value(Parameter::Dic), ks)
}

fn ta_dic(k: &Knowns, ks: &EquilibriumConstants, ass: &Assumptions) -> HSolution {
    pairs::h_from_ta_dic(k.value(Parameter::Ta), k.value(Parameter::Dic), k.bt, ks, ass)
}

const fn entry(
    a: Parameter,
    b: Parameter,
    kind: SolverKind,
    needs_temperature: bool,
    solve: SolveFn,
) -> SolverDescriptor {
    SolverDescriptor {
        pair: ParameterPair(a, b),
        kind,
        needs_temperature,
        solve,
    }
}

use Parameter::{Co2, Co3, Dic, Fco2, Hco3, Pco2, Ph, Ta};
use SolverKind::{ClosedForm, RootFinding};

/// Every supported pair. (CO2, fCO2), (CO2, pCO2) and (fCO2, pCO2) carry the
/// same information and are absent on purpose.
static SOLVERS: [SolverDescriptor; 25] = [
    entry(Ph, Co2, ClosedForm, false, from_ph),
    entry(Ph, Hco3, ClosedForm, false, from_ph),
    entry(Ph, Co3, ClosedForm, false, from_ph),
    entry(Ph, Ta, ClosedForm, false, from_ph),
    entry(Ph, Dic, ClosedForm, false, from_ph),
    entry(Ph, Fco2, ClosedForm, false, from_ph),
    entry(Ph, Pco2, ClosedForm, true, from_ph),
    entry(Co2, Hco3, ClosedForm, false, co2_hco3),
    entry(Co2, Co3, ClosedForm, false, co2_co3),
    entry(Co2, Ta, RootFinding, false, co2_ta),
    entry(Co2, Dic, ClosedForm, false, co2_dic),
    entry(Hco3, Co3, ClosedForm, false, hco3_co3),
    entry(Hco3, Ta, RootFinding, false, hco3_ta),
    entry(Hco3, Dic, ClosedForm, false, hco3_dic),
    entry(Hco3, Fco2, ClosedForm, false, co2_hco3),
    entry(Hco3, Pco2, ClosedForm, true, co2_hco3),
    entry(Co3, Ta, RootFinding, false, co3_ta),
    entry(Co3, Dic, ClosedForm, false, co3_dic),
    entry(Co3, Fco2, ClosedForm, false, co2_co3),
    entry(Co3, Pco2, ClosedForm, true, co2_co3),
    entry(Ta, Dic, RootFinding, false, ta_dic),
    entry(Ta, Fco2, RootFinding, false, co2_ta),
    entry(Ta, Pco2, RootFinding, true, co2_ta),
    entry(Dic, Fco2, ClosedForm, false, co2_dic),
    entry(Dic, Pco2, ClosedForm, true, co2_dic),
];

pub fn lookup(pair: ParameterPair) -> Option<&'static SolverDescriptor> {
    SOLVERS.iter().find(|d| d.pair == pair)
}

/// Carbonate parameters present in `inputs`, in canonical order.
pub fn supplied_parameters(inputs: &Inputs) -> Vec<Parameter> {
    Parameter::ALL
        .into_iter()
        .filter(|p| p.series(inputs).is_some())
        .collect()
}

/// The unique solver for exactly two supplied parameters.
pub fn select(supplied: &[Parameter]) -> Result<&'static SolverDescriptor, AppError> {
    match supplied {
        [] | [_] => Err(AppError::UnderdeterminedSystem {
            supplied: supplied.to_vec(),
        }),
        [a, b] => ParameterPair::new(*a, *b).and_then(lookup).ok_or_else(|| {
            AppError::OverdeterminedOrAmbiguous {
                supplied: supplied.to_vec(),
                reason: "the pair is not independent",
            }
        }),
        _ => Err(AppError::OverdeterminedOrAmbiguous {
            supplied: supplied.to_vec(),
            reason: "more than two carbonate parameters supplied",
        }),
    }
}
