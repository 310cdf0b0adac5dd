use serde::{Deserialize, Serialize};

use crate::chemistry::{R_SRM951, REF_CA_MOL_KG, REF_SALINITY, UPPSTROM_BT_MOL_KG};
use crate::error::AppError;
use crate::speciation::zero::SolverConfig;

/// A scalar or an element-wise array. Scalars (and length-1 arrays) broadcast
/// against arrays of any length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Scalar(_) => 1,
            Series::Array(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at row `i`, broadcasting length-1 series.
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Series::Scalar(x) => *x,
            Series::Array(v) if v.len() == 1 => v[0],
            Series::Array(v) => v[i],
        }
    }
}

impl From<f64> for Series {
    fn from(x: f64) -> Self {
        Series::Scalar(x)
    }
}

impl From<Vec<f64>> for Series {
    fn from(v: Vec<f64>) -> Self {
        Series::Array(v)
    }
}

impl From<&[f64]> for Series {
    fn from(v: &[f64]) -> Self {
        Series::Array(v.to_vec())
    }
}

/// Equilibrium constants at a single temperature/salinity/pressure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumConstants {
    #[serde(rename = "K0")]
    pub k0: f64,
    #[serde(rename = "K1")]
    pub k1: f64,
    #[serde(rename = "K2")]
    pub k2: f64,
    #[serde(rename = "KB")]
    pub kb: f64,
    #[serde(rename = "KW")]
    pub kw: f64,
    #[serde(rename = "KSO4")]
    pub kso4: f64,
    #[serde(rename = "KspA")]
    pub kspa: f64,
    #[serde(rename = "KspC")]
    pub kspc: f64,
}

impl EquilibriumConstants {
    /// Every constant is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [
            self.k0, self.k1, self.k2, self.kb, self.kw, self.kso4, self.kspa, self.kspc,
        ]
        .iter()
        .all(|k| k.is_finite() && *k > 0.0)
    }
}

/// Array-valued constant bundle, one `Series` per constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KsSeries {
    #[serde(rename = "K0")]
    pub k0: Series,
    #[serde(rename = "K1")]
    pub k1: Series,
    #[serde(rename = "K2")]
    pub k2: Series,
    #[serde(rename = "KB")]
    pub kb: Series,
    #[serde(rename = "KW")]
    pub kw: Series,
    #[serde(rename = "KSO4")]
    pub kso4: Series,
    #[serde(rename = "KspA")]
    pub kspa: Series,
    #[serde(rename = "KspC")]
    pub kspc: Series,
}

impl KsSeries {
    pub fn at(&self, i: usize) -> EquilibriumConstants {
        EquilibriumConstants {
            k0: self.k0.at(i),
            k1: self.k1.at(i),
            k2: self.k2.at(i),
            kb: self.kb.at(i),
            kw: self.kw.at(i),
            kso4: self.kso4.at(i),
            kspa: self.kspa.at(i),
            kspc: self.kspc.at(i),
        }
    }

    pub(crate) fn named(&self) -> [(&'static str, &Series); 8] {
        [
            ("K0", &self.k0),
            ("K1", &self.k1),
            ("K2", &self.k2),
            ("KB", &self.kb),
            ("KW", &self.kw),
            ("KSO4", &self.kso4),
            ("KspA", &self.kspa),
            ("KspC", &self.kspc),
        ]
    }
}

impl From<EquilibriumConstants> for KsSeries {
    fn from(ks: EquilibriumConstants) -> Self {
        Self {
            k0: ks.k0.into(),
            k1: ks.k1.into(),
            k2: ks.k2.into(),
            kb: ks.kb.into(),
            kw: ks.kw.into(),
            kso4: ks.kso4.into(),
            kspa: ks.kspa.into(),
            kspc: ks.kspc.into(),
        }
    }
}

/// Caller-supplied parameters. Exactly two of the carbonate parameters
/// (`ph` .. `pco2`) must be present; the rest are optional environment and
/// isotope inputs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(rename = "pH", default)]
    pub ph: Option<Series>,
    #[serde(rename = "CO2", default)]
    pub co2: Option<Series>,
    #[serde(rename = "HCO3", default)]
    pub hco3: Option<Series>,
    #[serde(rename = "CO3", default)]
    pub co3: Option<Series>,
    #[serde(rename = "TA", default)]
    pub ta: Option<Series>,
    #[serde(rename = "DIC", default)]
    pub dic: Option<Series>,
    #[serde(rename = "fCO2", default)]
    pub fco2: Option<Series>,
    #[serde(rename = "pCO2", default)]
    pub pco2: Option<Series>,

    /// Total boron, same units as the carbon species. Derived from `s` when absent.
    #[serde(rename = "BT", default)]
    pub bt: Option<Series>,
    /// Temperature in °C (default 25).
    #[serde(rename = "T", default)]
    pub t: Option<Series>,
    /// Practical salinity (default 35).
    #[serde(rename = "S", default)]
    pub s: Option<Series>,
    /// Calcium in mol/kg. Derived from `s` when absent.
    #[serde(rename = "Ca", default)]
    pub ca: Option<Series>,

    #[serde(rename = "alphaB", default)]
    pub alpha_b: Option<Series>,
    #[serde(rename = "ABT", default)]
    pub abt: Option<Series>,
    #[serde(rename = "ABO3", default)]
    pub abo3: Option<Series>,
    #[serde(rename = "ABO4", default)]
    pub abo4: Option<Series>,
    #[serde(rename = "dBT", default)]
    pub dbt: Option<Series>,
    #[serde(rename = "dBO3", default)]
    pub dbo3: Option<Series>,
    #[serde(rename = "dBO4", default)]
    pub dbo4: Option<Series>,

    #[serde(rename = "Ks")]
    pub ks: KsSeries,
}

impl Inputs {
    /// Empty parameter set around a constant bundle.
    pub fn new(ks: impl Into<KsSeries>) -> Self {
        Self {
            ph: None,
            co2: None,
            hco3: None,
            co3: None,
            ta: None,
            dic: None,
            fco2: None,
            pco2: None,
            bt: None,
            t: None,
            s: None,
            ca: None,
            alpha_b: None,
            abt: None,
            abo3: None,
            abo4: None,
            dbt: None,
            dbo3: None,
            dbo4: None,
            ks: ks.into(),
        }
    }

    /// Every present series by name, constants included.
    pub(crate) fn named_series(&self) -> Vec<(&'static str, &Series)> {
        let optional = [
            ("pH", &self.ph),
            ("CO2", &self.co2),
            ("HCO3", &self.hco3),
            ("CO3", &self.co3),
            ("TA", &self.ta),
            ("DIC", &self.dic),
            ("fCO2", &self.fco2),
            ("pCO2", &self.pco2),
            ("BT", &self.bt),
            ("T", &self.t),
            ("S", &self.s),
            ("Ca", &self.ca),
            ("alphaB", &self.alpha_b),
            ("ABT", &self.abt),
            ("ABO3", &self.abo3),
            ("ABO4", &self.abo4),
            ("dBT", &self.dbt),
            ("dBO3", &self.dbo3),
            ("dBO4", &self.dbo4),
        ];
        optional
            .into_iter()
            .filter_map(|(name, s)| s.as_ref().map(|s| (name, s)))
            .chain(self.ks.named())
            .collect()
    }

    /// Common row count of all series. Every series must have length 1 or n.
    pub fn rows(&self) -> Result<usize, AppError> {
        let named = self.named_series();
        if let Some((name, _)) = named.iter().find(|(_, s)| s.is_empty()) {
            return Err(AppError::EmptySeries { name: *name });
        }
        let n = named.iter().map(|(_, s)| s.len()).max().unwrap_or(1);
        for &(name, s) in &named {
            let len = s.len();
            if len != 1 && len != n {
                return Err(AppError::ShapeMismatch {
                    name,
                    len,
                    expected: n,
                });
            }
        }
        Ok(n)
    }

    pub(crate) fn temperature(&self, i: usize) -> f64 {
        self.t.as_ref().map_or(25.0, |t| t.at(i))
    }

    pub(crate) fn salinity(&self, i: usize) -> f64 {
        self.s.as_ref().map_or(REF_SALINITY, |s| s.at(i))
    }

    /// Total boron at row `i` in caller units.
    pub(crate) fn total_boron(&self, i: usize, unit: f64) -> f64 {
        match &self.bt {
            Some(bt) => bt.at(i),
            None => UPPSTROM_BT_MOL_KG * self.salinity(i) / REF_SALINITY * unit,
        }
    }

    /// Calcium at row `i` in mol/kg.
    pub(crate) fn calcium(&self, i: usize) -> f64 {
        match &self.ca {
            Some(ca) => ca.at(i),
            None => REF_CA_MOL_KG * self.salinity(i) / REF_SALINITY,
        }
    }
}

/// Calculation settings shared by every row.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    /// Scale of concentration inputs relative to mol/kg (1e6 for µmol/kg).
    pub unit: f64,
    /// ¹¹B/¹⁰B ratio of the δ¹¹B reference standard.
    pub r_std: f64,
    /// Pressure used for the density of volumetric inputs.
    pub pressure_dbar: f64,
    /// Concentration inputs are per litre rather than per kilogram.
    pub volumetric: bool,
    pub solver: SolverConfig,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            unit: 1.0,
            r_std: R_SRM951,
            pressure_dbar: 0.0,
            volumetric: false,
            solver: SolverConfig::default(),
        }
    }
}

impl Assumptions {
    /// Defaults for inputs in µmol/kg.
    pub fn micromolar() -> Self {
        Self {
            unit: 1e6,
            ..Default::default()
        }
    }
}
