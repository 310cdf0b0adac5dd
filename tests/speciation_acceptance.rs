use carbsys_rs::chemistry::boron::{bo3_from_bt_h, bo4_from_bt_h};
use carbsys_rs::chemistry::carbon::{co2_from_dic_h, co3_from_dic_h, hco3_from_dic_h};
use carbsys_rs::chemistry::isotopes::{a11_from_d11, d11_from_a11};
use carbsys_rs::chemistry::R_SRM951;
use carbsys_rs::{Assumptions, EquilibriumConstants, Inputs, SolverKind, speciate};

const H: f64 = 7.94328235e-09;

fn ks() -> EquilibriumConstants {
    EquilibriumConstants {
        k0: 0.028391881804015685,
        k1: 1.4218281371391736e-06,
        k2: 1.0815547472209423e-09,
        kb: 2.52657299e-09,
        kw: 6.0638636861053757e-14,
        kso4: 0.10030207107256615,
        kspa: 6.4817590680119676e-07,
        kspc: 4.2723509278625912e-07,
    }
}

#[test]
fn boron_speciation_at_reference_h() {
    let ks = ks();
    assert!((bo4_from_bt_h(433.0, H, &ks) - 104.49104305).abs() < 1e-6);
    assert!((bo3_from_bt_h(433.0, H, &ks) - 328.50895695).abs() < 1e-6);
}

#[test]
fn isotope_abundance_delta_conversion() {
    assert!((d11_from_a11(0.807817779214075, R_SRM951) - 39.5).abs() < 1e-6);
    assert!((a11_from_d11(39.5, R_SRM951) - 0.807817779214075).abs() < 1e-6);
}

#[test]
fn carbonate_speciation_at_reference_h() {
    let ks = ks();
    assert!((co2_from_dic_h(2000.0, H, &ks) - 9.7861814).abs() < 1e-5);
    assert!((hco3_from_dic_h(2000.0, H, &ks) - 1751.7025656).abs() < 1e-5);
    assert!((co3_from_dic_h(2000.0, H, &ks) - 238.511253).abs() < 1e-5);
}

#[test]
fn batch_with_broadcast_scalars_solves_every_row() {
    let mut inputs = Inputs::new(ks());
    inputs.ta = Some(vec![2200.0, 2300.0, 2400.0, 2500.0].into());
    inputs.dic = Some(2000.0.into());
    inputs.bt = Some(433.0.into());
    inputs.t = Some(vec![10.0, 15.0, 20.0, 25.0].into());

    let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
    assert_eq!(out.kind, SolverKind::RootFinding);
    assert_eq!(out.len(), 4);
    assert!(out.all_converged());

    // More alkalinity at fixed DIC means higher pH.
    let ph = out.column(|r| r.ph);
    assert!(ph.windows(2).all(|w| w[1] > w[0]), "{ph:?}");
    for r in &out.rows {
        assert!(r.diagnostic.iterations <= 100);
        assert!((r.co2 + r.hco3 + r.co3 - r.dic).abs() / r.dic < 1e-8);
    }
}

#[test]
fn large_batches_match_row_by_row_results() {
    let n = 200;
    let ta: Vec<f64> = (0..n).map(|i| 2100.0 + i as f64).collect();
    let mut batch = Inputs::new(ks());
    batch.ta = Some(ta.clone().into());
    batch.dic = Some(2000.0.into());
    batch.bt = Some(433.0.into());
    let ass = Assumptions::micromolar();
    let out = speciate(&batch, &ass).unwrap();

    for i in [0, 57, 199] {
        let mut single = Inputs::new(ks());
        single.ta = Some(ta[i].into());
        single.dic = Some(2000.0.into());
        single.bt = Some(433.0.into());
        let one = speciate(&single, &ass).unwrap();
        assert_eq!(one.rows[0].h, out.rows[i].h);
    }
}

#[test]
fn output_serializes_with_conventional_keys() {
    let mut inputs = Inputs::new(ks());
    inputs.ph = Some(8.1.into());
    inputs.dic = Some(2000.0.into());
    inputs.dbt = Some(39.5.into());
    let out = speciate(&inputs, &Assumptions::micromolar()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    let row = &json["rows"][0];
    for key in ["pH", "CO2", "HCO3", "CO3", "TA", "DIC", "fCO2", "pCO2", "BO3", "BO4", "OmegaA"] {
        assert!(row[key].is_number(), "{key}");
    }
    assert!(row["isotopes"]["dBO4"].is_number());
    assert_eq!(json["pair"], serde_json::json!(["pH", "DIC"]));
    assert!(json["Ks"]["K1"].is_number());
}
