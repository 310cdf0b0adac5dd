//! TEOS-10 density for converting per-litre concentrations to per-kilogram.

use gsw as gsw_teos10;
use tracing::debug;

use crate::models::{Inputs, Series};

/// Reference Salinity (g/kg) from Practical Salinity, used as Absolute
/// Salinity. Exact for standard seawater composition.
pub fn sa_from_sp(sp: f64) -> f64 {
    gsw_teos10::conversions::sr_from_sp(sp)
}

/// In-situ density (kg/m³) from SA, CT and pressure (75-term polynomial).
/// `NaN` when `gsw` rejects the state, so the affected row is flagged.
pub fn rho(sa: f64, ct: f64, p_dbar: f64) -> f64 {
    gsw_teos10::volume::rho(sa, ct, p_dbar).unwrap_or(f64::NAN)
}

/// Seawater mass per litre (kg/L) at practical salinity `sp` and `t_c` °C.
///
/// In-situ temperature stands in for Conservative Temperature; near the
/// surface the difference moves density by less than 1e-5 relative.
pub fn kg_per_litre(sp: f64, t_c: f64, p_dbar: f64) -> f64 {
    rho(sa_from_sp(sp), t_c, p_dbar) / 1000.0
}

/// Copy of `inputs` with CO2, HCO3, CO3, TA, DIC and BT converted from
/// per-litre to per-kilogram over `n` rows. pH, fugacities, isotopes and
/// the constants are unaffected.
pub fn gravimetric_inputs(inputs: &Inputs, n: usize, p_dbar: f64) -> Inputs {
    let density: Vec<f64> = (0..n)
        .map(|i| kg_per_litre(inputs.salinity(i), inputs.temperature(i), p_dbar))
        .collect();
    debug!(rows = n, p_dbar, "converting volumetric inputs");
    let per_kg = |s: &Option<Series>| {
        s.as_ref()
            .map(|s| Series::Array(density.iter().enumerate().map(|(i, d)| s.at(i) / d).collect()))
    };
    Inputs {
        co2: per_kg(&inputs.co2),
        hco3: per_kg(&inputs.hco3),
        co3: per_kg(&inputs.co3),
        ta: per_kg(&inputs.ta),
        dic: per_kg(&inputs.dic),
        bt: per_kg(&inputs.bt),
        ..inputs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EquilibriumConstants;

    #[test]
    fn reference_salinity_scales_practical_salinity() {
        let sa = sa_from_sp(35.0);
        assert!((sa - 35.16504).abs() < 1e-6);
    }

    #[test]
    fn surface_seawater_density_is_plausible() {
        let d = kg_per_litre(35.0, 25.0, 0.0);
        assert!(d > 1.022 && d < 1.025, "{d}");
        // Fresher and colder water.
        assert!(kg_per_litre(30.0, 25.0, 0.0) < d);
        assert!(kg_per_litre(35.0, 5.0, 0.0) > d);
    }

    #[test]
    fn converts_concentrations_only() {
        let ks = EquilibriumConstants {
            k0: 0.028391881804015685,
            k1: 1.4218281371391736e-06,
            k2: 1.0815547472209423e-09,
            kb: 2.5265729902477677e-09,
            kw: 6.0638636861053757e-14,
            kso4: 0.10030207107256615,
            kspa: 6.4817590680119676e-07,
            kspc: 4.2723509278625912e-07,
        };
        let mut inputs = Inputs::new(ks);
        inputs.ph = Some(8.1.into());
        inputs.dic = Some(vec![2000.0, 2100.0].into());
        inputs.s = Some(vec![35.0, 30.0].into());

        let out = gravimetric_inputs(&inputs, 2, 0.0);
        assert_eq!(out.ph, inputs.ph);
        assert!(out.ta.is_none() && out.bt.is_none());
        let dic = out.dic.unwrap();
        assert!((dic.at(0) - 2000.0 / kg_per_litre(35.0, 25.0, 0.0)).abs() < 1e-9);
        assert!((dic.at(1) - 2100.0 / kg_per_litre(30.0, 25.0, 0.0)).abs() < 1e-9);
        assert!(dic.at(0) < 2000.0);
    }
}
