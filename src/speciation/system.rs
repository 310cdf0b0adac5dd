//! Batch entry point: validates the parameter set, solves [H+] per row and
//! back-fills the complete carbonate, boron and isotope state.

use serde::Serialize;
use tracing::{debug, warn};

use crate::adapters::teos10::gravimetric_inputs;
use crate::chemistry::boron::bo4_from_bt_h;
use crate::chemistry::carbon::{
    co2_from_dic_h, co2_from_ta_h, co3_from_dic_h, dic_from_co2_h, dic_from_co3_h,
    dic_from_hco3_h, fco2_from_co2, hco3_from_dic_h, pco2_from_fco2, ta_from_co2_h,
};
use crate::chemistry::isotopes::alpha_b;
use crate::chemistry::{omega, ph_from_h};
use crate::error::{AppError, ElementFault};
use crate::models::{Assumptions, EquilibriumConstants, Inputs, KsSeries};
use crate::speciation::dispatch::{
    Knowns, ParameterPair, SolverDescriptor, SolverKind, select, supplied_parameters,
};
use crate::speciation::isotopes::{IsotopeInput, IsotopeSet, isotope_input, isotope_set};
use crate::speciation::zero::{Diagnostic, HSolution};

/// Rows below this count are solved on the calling thread.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 64;

/// Complete state of one row. Concentrations are in caller units, [H+] in mol/kg.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CarbonateState {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "H")]
    pub h: f64,
    #[serde(rename = "CO2")]
    pub co2: f64,
    #[serde(rename = "HCO3")]
    pub hco3: f64,
    #[serde(rename = "CO3")]
    pub co3: f64,
    #[serde(rename = "TA")]
    pub ta: f64,
    #[serde(rename = "DIC")]
    pub dic: f64,
    #[serde(rename = "fCO2")]
    pub fco2: f64,
    #[serde(rename = "pCO2")]
    pub pco2: f64,
    #[serde(rename = "BT")]
    pub bt: f64,
    #[serde(rename = "BO3")]
    pub bo3: f64,
    #[serde(rename = "BO4")]
    pub bo4: f64,
    /// Calcium, mol/kg.
    #[serde(rename = "Ca")]
    pub ca: f64,
    #[serde(rename = "OmegaA")]
    pub omega_a: f64,
    #[serde(rename = "OmegaC")]
    pub omega_c: f64,
    #[serde(rename = "T")]
    pub t: f64,
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isotopes: Option<IsotopeSet>,
    pub diagnostic: Diagnostic,
    pub converged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<ElementFault>,
}

/// Environment of a row that is reported whether or not it solves.
#[derive(Clone, Copy, Debug)]
struct Environment {
    bt: f64,
    ca: f64,
    t: f64,
    s: f64,
}

impl CarbonateState {
    fn solved(
        h: f64,
        dic: f64,
        env: Environment,
        ks: &EquilibriumConstants,
        ass: &Assumptions,
        diagnostic: Diagnostic,
    ) -> Self {
        let co2 = co2_from_dic_h(dic, h, ks);
        let co3 = co3_from_dic_h(dic, h, ks);
        let fco2 = fco2_from_co2(co2, ks);
        let bo4 = bo4_from_bt_h(env.bt, h, ks);
        Self {
            ph: ph_from_h(h),
            h,
            co2,
            hco3: hco3_from_dic_h(dic, h, ks),
            co3,
            ta: ta_from_co2_h(co2, h, env.bt, ks, ass.unit),
            dic,
            fco2,
            pco2: pco2_from_fco2(fco2, env.t),
            bt: env.bt,
            bo3: env.bt - bo4,
            bo4,
            ca: env.ca,
            omega_a: omega(co3, env.ca, ks.kspa, ass.unit),
            omega_c: omega(co3, env.ca, ks.kspc, ass.unit),
            t: env.t,
            s: env.s,
            isotopes: None,
            diagnostic,
            converged: true,
            fault: None,
        }
    }

    fn failed(env: Environment, diagnostic: Diagnostic) -> Self {
        let nan = f64::NAN;
        Self {
            ph: nan,
            h: nan,
            co2: nan,
            hco3: nan,
            co3: nan,
            ta: nan,
            dic: nan,
            fco2: nan,
            pco2: nan,
            bt: env.bt,
            bo3: nan,
            bo4: nan,
            ca: env.ca,
            omega_a: nan,
            omega_c: nan,
            t: env.t,
            s: env.s,
            isotopes: None,
            diagnostic,
            converged: false,
            fault: diagnostic.fault(),
        }
    }
}

/// Result of [`speciate`]: one state per input row, in input order.
#[derive(Clone, Debug, Serialize)]
pub struct Speciation {
    pub pair: ParameterPair,
    pub kind: SolverKind,
    #[serde(rename = "Ks")]
    pub ks: KsSeries,
    pub rows: Vec<CarbonateState>,
}

impl Speciation {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One field across all rows.
    pub fn column(&self, field: impl Fn(&CarbonateState) -> f64) -> Vec<f64> {
        self.rows.iter().map(field).collect()
    }

    pub fn all_converged(&self) -> bool {
        self.rows.iter().all(|r| r.converged)
    }

    /// Index and fault of every row that did not solve.
    pub fn faults(&self) -> Vec<(usize, ElementFault)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.fault.map(|f| (i, f)))
            .collect()
    }
}

/// Solves the carbonate system for every row of `inputs`.
///
/// Exactly two carbonate parameters must be supplied. Shape errors and
/// unsupported parameter sets fail the whole call; per-row problems
/// (non-physical values, non-convergence) are reported on the row.
pub fn speciate(inputs: &Inputs, ass: &Assumptions) -> Result<Speciation, AppError> {
    let supplied = supplied_parameters(inputs);
    let solver = select(&supplied)?;
    let isotope = isotope_input(inputs)?;
    let n = inputs.rows()?;

    if solver.needs_temperature && inputs.t.is_none() {
        warn!(pair = %solver.pair, "temperature not supplied, assuming 25 °C");
    }
    debug!(pair = %solver.pair, kind = ?solver.kind, rows = n, "speciating");

    let converted;
    let inputs = if ass.volumetric {
        converted = gravimetric_inputs(inputs, n, ass.pressure_dbar);
        &converted
    } else {
        inputs
    };
    let row = |i: usize| solve_row(inputs, i, solver, isotope, ass);

    #[cfg(feature = "parallel")]
    let rows: Vec<CarbonateState> = if n > PARALLEL_THRESHOLD {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(row).collect()
    } else {
        (0..n).map(row).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<CarbonateState> = (0..n).map(row).collect();

    Ok(Speciation {
        pair: solver.pair,
        kind: solver.kind,
        ks: inputs.ks.clone(),
        rows,
    })
}

fn solve_row(
    inputs: &Inputs,
    i: usize,
    solver: &SolverDescriptor,
    isotope: Option<IsotopeInput>,
    ass: &Assumptions,
) -> CarbonateState {
    let ks = inputs.ks.at(i);
    let knowns = Knowns::at(inputs, i, ass.unit);
    let env = Environment {
        bt: knowns.bt,
        ca: inputs.calcium(i),
        t: knowns.t_c,
        s: inputs.salinity(i),
    };

    let sol = if ks.is_valid() && knowns.is_valid(solver.pair) {
        (solver.solve)(&knowns, &ks, ass)
    } else {
        HSolution::invalid()
    };
    let dic = if sol.converged() {
        dic_anchor(&knowns, sol.h, &ks, ass.unit)
    } else {
        f64::NAN
    };

    let alpha = inputs
        .alpha_b
        .as_ref()
        .map_or_else(|| alpha_b(env.t), |a| a.at(i));
    let mut state = if dic.is_finite() && dic > 0.0 {
        CarbonateState::solved(sol.h, dic, env, &ks, ass, sol.diag)
    } else {
        let diag = if sol.converged() {
            HSolution::invalid().diag
        } else {
            sol.diag
        };
        debug!(row = i, status = ?diag.status, residual = diag.residual, "row not solved");
        CarbonateState::failed(env, diag)
    };

    if let Some(input) = isotope {
        state.isotopes = Some(match input.series(inputs) {
            Some(values) if state.converged => {
                isotope_set(state.h, &ks, input, values.at(i), alpha, ass.r_std)
            }
            _ => IsotopeSet::undefined(alpha),
        });
    }
    state
}

/// DIC implied by [H+] and whichever known quantity carries carbon.
fn dic_anchor(k: &Knowns, h: f64, ks: &EquilibriumConstants, unit: f64) -> f64 {
    if let Some(dic) = k.dic {
        dic
    } else if let Some(co2) = k.co2_equivalent(ks) {
        dic_from_co2_h(co2, h, ks)
    } else if let Some(hco3) = k.hco3 {
        dic_from_hco3_h(hco3, h, ks)
    } else if let Some(co3) = k.co3 {
        dic_from_co3_h(co3, h, ks)
    } else if let Some(ta) = k.ta {
        dic_from_co2_h(co2_from_ta_h(ta, h, k.bt, ks, unit), h, ks)
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speciation::dispatch::Parameter;
    use crate::speciation::zero::SolveStatus;

    fn ks() -> EquilibriumConstants {
        EquilibriumConstants {
            k0: 0.028391881804015685,
            k1: 1.4218281371391736e-06,
            k2: 1.0815547472209423e-09,
            kb: 2.5265729902477677e-09,
            kw: 6.0638636861053757e-14,
            kso4: 0.10030207107256615,
            kspa: 6.4817590680119676e-07,
            kspc: 4.2723509278625912e-07,
        }
    }

    fn base() -> Inputs {
        let mut inputs = Inputs::new(ks());
        inputs.bt = Some(433.0.into());
        inputs
    }

    fn rel(a: f64, b: f64) -> f64 {
        (a - b).abs() / b.abs()
    }

    #[test]
    fn ph_and_dic_fill_the_reference_state() {
        let mut inputs = base();
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(2000.0.into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
        assert_eq!(out.kind, SolverKind::ClosedForm);
        let r = out.rows[0];
        assert!(r.converged);
        assert!(rel(r.co2, 9.7861814) < 1e-6);
        assert!(rel(r.hco3, 1751.7025656) < 1e-6);
        assert!(rel(r.co3, 238.511253) < 1e-6);
        assert!(rel(r.ta, 2340.84212345) < 1e-6);
        assert!(rel(r.fco2, 344.68238018) < 1e-6);
        assert!(rel(r.bo4, 104.49104305) < 1e-6);
        assert!(r.omega_a > 1.0 && r.omega_c > r.omega_a);
    }

    #[test]
    fn species_add_up_to_totals() {
        let mut inputs = base();
        inputs.ta = Some(vec![2100.0, 2340.84, 2600.0].into());
        inputs.dic = Some(vec![1900.0, 2000.0, 2300.0].into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
        for r in &out.rows {
            assert!(rel(r.co2 + r.hco3 + r.co3, r.dic) < 1e-8);
            assert!(rel(r.bo3 + r.bo4, r.bt) < 1e-12);
        }
    }

    /// dTA/dh at fixed CO3; negative on the alkaline side of the TA minimum.
    fn co3_ta_slope(r: &CarbonateState, ks: &EquilibriumConstants, unit: f64) -> f64 {
        let kb_h = ks.kb + r.h;
        r.co3 / ks.k2 - r.bt * ks.kb / (kb_h * kb_h) - (ks.kw / (r.h * r.h) + 1.0) * unit
    }

    #[test]
    fn resolving_from_any_two_outputs_is_idempotent() {
        let ks = ks();
        let ass = Assumptions::micromolar();

        for step in 0..=19 {
            let ph = 6.0 + 0.2 * step as f64;
            let mut inputs = base();
            inputs.ph = Some(ph.into());
            inputs.dic = Some(2000.0.into());
            let first = speciate(&inputs, &ass).unwrap().rows[0];

            let value = |p: Parameter| match p {
                Parameter::Ph => first.ph,
                Parameter::Co2 => first.co2,
                Parameter::Hco3 => first.hco3,
                Parameter::Co3 => first.co3,
                Parameter::Ta => first.ta,
                Parameter::Dic => first.dic,
                Parameter::Fco2 => first.fco2,
                Parameter::Pco2 => first.pco2,
            };
            let set = |inputs: &mut Inputs, p: Parameter| {
                let v = Some(value(p).into());
                match p {
                    Parameter::Ph => inputs.ph = v,
                    Parameter::Co2 => inputs.co2 = v,
                    Parameter::Hco3 => inputs.hco3 = v,
                    Parameter::Co3 => inputs.co3 = v,
                    Parameter::Ta => inputs.ta = v,
                    Parameter::Dic => inputs.dic = v,
                    Parameter::Fco2 => inputs.fco2 = v,
                    Parameter::Pco2 => inputs.pco2 = v,
                }
            };

            for (i, a) in Parameter::ALL.into_iter().enumerate() {
                for b in Parameter::ALL.into_iter().skip(i + 1) {
                    let mut again = base();
                    set(&mut again, a);
                    set(&mut again, b);
                    let Ok(out) = speciate(&again, &ass) else {
                        continue;
                    };
                    let r = out.rows[0];
                    let name = format!("{a}_{b} at pH {ph:.1}");
                    assert!(r.converged, "{name}");

                    match (a, b) {
                        // The alkaline root K1·K2/h is returned once h > √(K1·K2).
                        (Parameter::Hco3, Parameter::Dic) => {
                            let alkaline = first.h.min(ks.k1 * ks.k2 / first.h);
                            assert!(rel(r.h, alkaline) < 1e-6, "{name}: {}", r.ph);
                            assert!(r.diagnostic.ambiguous, "{name}");
                            assert!(rel(r.dic, first.dic) < 1e-6, "{name}");
                        }
                        // Past the TA minimum the acidic root is returned.
                        (Parameter::Co3, Parameter::Ta) => {
                            if co3_ta_slope(&first, &ks, ass.unit) < 0.0 {
                                assert!(r.h > first.h * 1.01, "{name}: {}", r.ph);
                            } else {
                                assert!(rel(r.h, first.h) < 1e-6, "{name}: {}", r.ph);
                            }
                            assert!(r.diagnostic.ambiguous, "{name}");
                            assert!(rel(r.ta, first.ta) < 1e-6, "{name}");
                        }
                        _ => {
                            assert!(rel(r.h, first.h) < 1e-6, "{name}: {} vs {}", r.ph, first.ph);
                            assert!(rel(r.ta, first.ta) < 1e-6, "{name}");
                            assert!(rel(r.dic, first.dic) < 1e-6, "{name}");
                            assert!(!r.diagnostic.ambiguous, "{name}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn bad_row_does_not_poison_the_batch() {
        let mut inputs = base();
        inputs.ta = Some(vec![2300.0, -5.0, 2400.0].into());
        inputs.dic = Some(2000.0.into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.rows[0].converged && out.rows[2].converged);
        assert!(out.rows[1].ph.is_nan());
        assert_eq!(out.rows[1].diagnostic.status, SolveStatus::InvalidDomain);
        assert_eq!(out.faults(), vec![(1, ElementFault::InvalidDomainValue)]);
        assert!(!out.all_converged());
    }

    #[test]
    fn invalid_constants_flag_the_row() {
        let mut ks_series = KsSeries::from(ks());
        ks_series.k1 = vec![1.4218281371391736e-06, 0.0].into();
        let mut inputs = Inputs::new(ks_series);
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(2000.0.into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
        assert!(out.rows[0].converged);
        assert_eq!(out.rows[1].fault, Some(ElementFault::InvalidDomainValue));
    }

    #[test]
    fn parameter_count_is_checked() {
        let mut inputs = base();
        inputs.ph = Some(8.1.into());
        assert!(matches!(
            speciate(&inputs, &Assumptions::micromolar()),
            Err(AppError::UnderdeterminedSystem { .. })
        ));
        inputs.ta = Some(2300.0.into());
        inputs.dic = Some(2000.0.into());
        assert!(matches!(
            speciate(&inputs, &Assumptions::micromolar()),
            Err(AppError::OverdeterminedOrAmbiguous { .. })
        ));
    }

    #[test]
    fn isotopes_follow_the_solved_ph() {
        let mut inputs = base();
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(2000.0.into());
        inputs.dbt = Some(39.5.into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
        let iso = out.rows[0].isotopes.unwrap();
        assert!((iso.alpha_b - 1.02725).abs() < 1e-12);
        assert!((iso.dbo4 - 18.55320208).abs() < 1e-4);
        assert!((iso.dbo3 - 46.30877684).abs() < 1e-4);
    }

    #[test]
    fn out_of_range_isotope_anchor_is_flagged_on_the_set() {
        let mut inputs = base();
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(2000.0.into());
        inputs.abt = Some(vec![0.8, 1.2].into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();

        let good = out.rows[0].isotopes.unwrap();
        assert_eq!(good.fault, None);
        assert!(good.dbt.is_finite());

        let bad = out.rows[1];
        assert!(bad.converged);
        assert_eq!(bad.fault, None);
        let iso = bad.isotopes.unwrap();
        assert_eq!(iso.fault, Some(ElementFault::InvalidDomainValue));
        assert!(iso.abo4.is_nan() && iso.dbt.is_nan());
    }

    #[test]
    fn boron_defaults_to_salinity_ratio() {
        let mut inputs = Inputs::new(ks());
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(2000.0.into());
        let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
        assert!((out.rows[0].bt - 415.7).abs() < 1e-9);
    }

    #[test]
    fn volumetric_inputs_are_converted_per_kilogram() {
        let mut inputs = base();
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(2000.0.into());
        let ass = Assumptions {
            volumetric: true,
            ..Assumptions::micromolar()
        };
        let out = speciate(&inputs, &ass).unwrap();
        let r = out.rows[0];
        assert!(r.converged);
        assert!(r.dic < 2000.0 && r.dic > 1950.0);
        assert!(r.bt < 433.0);
    }
}
