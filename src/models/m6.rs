//! Model `m6`: two Burn slabs within the same telescope beam.
//!
//! Each component is an extended region that both emits and Faraday-rotates,
//! which depolarizes it with a sinc envelope in `λ²` (Burn 1966, eq. 18;
//! Sokoloff et al. 1998, eq. 3; O'Sullivan et al. 2012, eq. 9). The two
//! components are unresolved, so their complex polarizations add.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::domain::ParamMap;
use crate::error::ParamError;
use crate::math::burn_slab_component;
use crate::models::model::{QuModel, require};
use crate::prior::{Boundary, Prior, PriorDict};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct M6Params {
    #[serde(rename = "fracPol1")]
    pub frac_pol1: f64,
    #[serde(rename = "fracPol2")]
    pub frac_pol2: f64,
    pub psi01_deg: f64,
    pub psi02_deg: f64,
    #[serde(rename = "RM1_radm2")]
    pub rm1_radm2: f64,
    #[serde(rename = "RM2_radm2")]
    pub rm2_radm2: f64,
    #[serde(rename = "deltaRM1_radm2")]
    pub delta_rm1_radm2: f64,
    #[serde(rename = "deltaRM2_radm2")]
    pub delta_rm2_radm2: f64,
}

impl TryFrom<&ParamMap> for M6Params {
    type Error = ParamError;

    fn try_from(p: &ParamMap) -> Result<Self, Self::Error> {
        Ok(Self {
            frac_pol1: require(p, "fracPol1")?,
            frac_pol2: require(p, "fracPol2")?,
            psi01_deg: require(p, "psi01_deg")?,
            psi02_deg: require(p, "psi02_deg")?,
            rm1_radm2: require(p, "RM1_radm2")?,
            rm2_radm2: require(p, "RM2_radm2")?,
            delta_rm1_radm2: require(p, "deltaRM1_radm2")?,
            delta_rm2_radm2: require(p, "deltaRM2_radm2")?,
        })
    }
}

impl M6Params {
    pub fn to_param_map(&self) -> ParamMap {
        [
            ("fracPol1", self.frac_pol1),
            ("fracPol2", self.frac_pol2),
            ("psi01_deg", self.psi01_deg),
            ("psi02_deg", self.psi02_deg),
            ("RM1_radm2", self.rm1_radm2),
            ("RM2_radm2", self.rm2_radm2),
            ("deltaRM1_radm2", self.delta_rm1_radm2),
            ("deltaRM2_radm2", self.delta_rm2_radm2),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

impl QuModel for M6Params {
    fn model_qu(&self, lam_sq: &[f64]) -> Vec<Complex64> {
        lam_sq
            .iter()
            .map(|&l2| {
                burn_slab_component(self.frac_pol1, self.psi01_deg, self.rm1_radm2, self.delta_rm1_radm2, l2)
                    + burn_slab_component(
                        self.frac_pol2,
                        self.psi02_deg,
                        self.rm2_radm2,
                        self.delta_rm2_radm2,
                        l2,
                    )
            })
            .collect()
    }
}

/// Evaluate the model from a loose parameter draw.
pub fn model(params: &ParamMap, lam_sq: &[f64]) -> Result<Vec<Complex64>, ParamError> {
    Ok(M6Params::try_from(params)?.model_qu(lam_sq))
}

/// Add `delta_RM1_RM2_radm2` and `sum_p1_p2` to a draw.
pub fn converter(params: &ParamMap) -> Result<ParamMap, ParamError> {
    let mut out = params.clone();
    out.insert(
        "delta_RM1_RM2_radm2".to_string(),
        require(params, "RM1_radm2")? - require(params, "RM2_radm2")?,
    );
    out.insert(
        "sum_p1_p2".to_string(),
        require(params, "fracPol1")? + require(params, "fracPol2")?,
    );
    Ok(out)
}

pub fn priors() -> PriorDict {
    let mut pd = PriorDict::new(converter);

    pd.insert(Prior::uniform("fracPol1", 0.0, 1.0, "$p_1$"));
    pd.insert(Prior::uniform("fracPol2", 0.0, 1.0, "$p_2$"));

    pd.insert(
        Prior::uniform("psi01_deg", 0.0, 180.0, r"$\psi_{0,1}$ (deg)").with_boundary(Boundary::Periodic),
    );
    pd.insert(
        Prior::uniform("psi02_deg", 0.0, 180.0, r"$\psi_{0,2}$ (deg)").with_boundary(Boundary::Periodic),
    );

    pd.insert(Prior::uniform("RM1_radm2", -1100.0, 1100.0, r"$\phi_1$ (rad m$^{-2}$)"));
    pd.insert(Prior::uniform("RM2_radm2", -1100.0, 1100.0, r"$\phi_2$ (rad m$^{-2}$)"));

    pd.insert(Prior::uniform("deltaRM1_radm2", 0.0, 100.0, r"$\Delta{RM,1}$ (rad m$^{-2}$)"));
    pd.insert(Prior::uniform("deltaRM2_radm2", 0.0, 100.0, r"$\Delta{RM,2}$ (rad m$^{-2}$)"));

    // RM1 > RM2 removes the label-swap degeneracy between the two slabs.
    pd.insert(Prior::constraint(
        "delta_RM1_RM2_radm2",
        0.0,
        2200.0,
        r"$\Delta\phi_{1,2}$ (rad m$^{-2}$)",
    ));
    pd.insert(Prior::constraint("sum_p1_p2", 0.0, 1.0, "$p_1+p_2$"));

    pd
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::thin_component;

    fn params() -> M6Params {
        M6Params {
            frac_pol1: 0.3,
            frac_pol2: 0.2,
            psi01_deg: 30.0,
            psi02_deg: 120.0,
            rm1_radm2: 50.0,
            rm2_radm2: -20.0,
            delta_rm1_radm2: 10.0,
            delta_rm2_radm2: 40.0,
        }
    }

    #[test]
    fn param_map_round_trips_through_typed_record() {
        let p = params();
        assert_eq!(M6Params::try_from(&p.to_param_map()).unwrap(), p);
    }

    #[test]
    fn missing_key_is_typed_error() {
        let mut map = params().to_param_map();
        map.shift_remove("deltaRM2_radm2");
        assert_eq!(
            model(&map, &[0.1]),
            Err(ParamError::Missing("deltaRM2_radm2".to_string()))
        );
    }

    #[test]
    fn matches_closed_form() {
        let p = params();
        let lam_sq = [0.02, 0.05, 0.11];
        let qu = p.model_qu(&lam_sq);
        for (i, &l2) in lam_sq.iter().enumerate() {
            let c1 = Complex64::new(0.0, 2.0 * (30f64.to_radians() + (0.5 * 10.0 + 50.0) * l2)).exp()
                * 0.3
                * (10.0 * l2).sin()
                / (10.0 * l2);
            let c2 = Complex64::new(0.0, 2.0 * (120f64.to_radians() + (0.5 * 40.0 - 20.0) * l2)).exp()
                * 0.2
                * (40.0 * l2).sin()
                / (40.0 * l2);
            let expected = c1 + c2;
            assert_abs_diff_eq!(qu[i].re, expected.re, epsilon = 1e-13);
            assert_abs_diff_eq!(qu[i].im, expected.im, epsilon = 1e-13);
        }
    }

    #[test]
    fn vanishing_depth_approaches_undamped_components() {
        let p = M6Params {
            delta_rm1_radm2: 1e-8,
            delta_rm2_radm2: 1e-8,
            ..params()
        };
        for &l2 in &[0.01, 0.04, 0.09, 0.25] {
            let qu = p.model_qu(&[l2])[0];
            let undamped = thin_component(0.3, 30.0, 50.0, l2) + thin_component(0.2, 120.0, -20.0, l2);
            assert_abs_diff_eq!(qu.re, undamped.re, epsilon = 1e-8);
            assert_abs_diff_eq!(qu.im, undamped.im, epsilon = 1e-8);
        }
    }

    #[test]
    fn zero_depth_and_zero_lambda_are_finite() {
        let p = M6Params {
            delta_rm1_radm2: 0.0,
            ..params()
        };
        let qu = p.model_qu(&[0.0, 0.05]);
        assert!(qu.iter().all(|c| c.re.is_finite() && c.im.is_finite()));
        // At λ² = 0 only the intrinsic angles matter.
        let at_zero = thin_component(0.3, 30.0, 0.0, 0.0) + thin_component(0.2, 120.0, 0.0, 0.0);
        assert_abs_diff_eq!(qu[0].re, at_zero.re, epsilon = 1e-15);
        assert_abs_diff_eq!(qu[0].im, at_zero.im, epsilon = 1e-15);
    }

    #[test]
    fn converter_is_deterministic_and_idempotent() {
        let base = params().to_param_map();
        let once = converter(&base).unwrap();
        let twice = converter(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once["delta_RM1_RM2_radm2"], 70.0);
        assert_abs_diff_eq!(once["sum_p1_p2"], 0.5);
    }

    #[test]
    fn prior_rejects_reversed_rm_order_and_overpolarization() {
        let pd = priors();
        let ok = params().to_param_map();
        assert!(pd.evaluate_constraints(&ok).unwrap());

        let swapped = M6Params {
            rm1_radm2: -20.0,
            rm2_radm2: 50.0,
            ..params()
        };
        assert_eq!(
            pd.violated_constraints(&swapped.to_param_map()).unwrap(),
            vec!["delta_RM1_RM2_radm2".to_string()]
        );

        let hot = M6Params {
            frac_pol1: 0.7,
            frac_pol2: 0.6,
            ..params()
        };
        assert_eq!(pd.ln_prob(&hot.to_param_map()).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn prior_table_matches_model() {
        let pd = priors();
        assert_eq!(pd.len(), 10);
        let drm = pd.get("deltaRM1_radm2").unwrap();
        assert_eq!((drm.minimum, drm.maximum), (0.0, 100.0));
        assert_eq!(pd.get("psi02_deg").unwrap().boundary, Some(Boundary::Periodic));
        assert!(pd.get("sum_p1_p2").unwrap().is_constraint());
    }
}
