//! Model `m111`: three Faraday-thin components within the same telescope beam.
//!
//! Each component has a single rotation measure and no internal
//! depolarization (Sokoloff et al. 1998, eq. 2; O'Sullivan et al. 2012, eq. 8).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::domain::ParamMap;
use crate::error::ParamError;
use crate::math::thin_component;
use crate::models::model::{QuModel, require};
use crate::prior::{Boundary, Prior, PriorDict};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct M111Params {
    #[serde(rename = "fracPol1")]
    pub frac_pol1: f64,
    #[serde(rename = "fracPol2")]
    pub frac_pol2: f64,
    #[serde(rename = "fracPol3")]
    pub frac_pol3: f64,
    pub psi01_deg: f64,
    pub psi02_deg: f64,
    pub psi03_deg: f64,
    #[serde(rename = "RM1_radm2")]
    pub rm1_radm2: f64,
    #[serde(rename = "RM2_radm2")]
    pub rm2_radm2: f64,
    #[serde(rename = "RM3_radm2")]
    pub rm3_radm2: f64,
}

impl TryFrom<&ParamMap> for M111Params {
    type Error = ParamError;

    fn try_from(p: &ParamMap) -> Result<Self, Self::Error> {
        Ok(Self {
            frac_pol1: require(p, "fracPol1")?,
            frac_pol2: require(p, "fracPol2")?,
            frac_pol3: require(p, "fracPol3")?,
            psi01_deg: require(p, "psi01_deg")?,
            psi02_deg: require(p, "psi02_deg")?,
            psi03_deg: require(p, "psi03_deg")?,
            rm1_radm2: require(p, "RM1_radm2")?,
            rm2_radm2: require(p, "RM2_radm2")?,
            rm3_radm2: require(p, "RM3_radm2")?,
        })
    }
}

impl M111Params {
    pub fn to_param_map(&self) -> ParamMap {
        [
            ("fracPol1", self.frac_pol1),
            ("fracPol2", self.frac_pol2),
            ("fracPol3", self.frac_pol3),
            ("psi01_deg", self.psi01_deg),
            ("psi02_deg", self.psi02_deg),
            ("psi03_deg", self.psi03_deg),
            ("RM1_radm2", self.rm1_radm2),
            ("RM2_radm2", self.rm2_radm2),
            ("RM3_radm2", self.rm3_radm2),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// `(p, ψ0, RM)` for each component.
    fn components(&self) -> [(f64, f64, f64); 3] {
        [
            (self.frac_pol1, self.psi01_deg, self.rm1_radm2),
            (self.frac_pol2, self.psi02_deg, self.rm2_radm2),
            (self.frac_pol3, self.psi03_deg, self.rm3_radm2),
        ]
    }
}

impl QuModel for M111Params {
    fn model_qu(&self, lam_sq: &[f64]) -> Vec<Complex64> {
        let comps = self.components();
        lam_sq
            .iter()
            .map(|&l2| {
                comps
                    .iter()
                    .map(|&(p, psi, rm)| thin_component(p, psi, rm, l2))
                    .sum()
            })
            .collect()
    }
}

/// Evaluate the model from a loose parameter draw.
pub fn model(params: &ParamMap, lam_sq: &[f64]) -> Result<Vec<Complex64>, ParamError> {
    Ok(M111Params::try_from(params)?.model_qu(lam_sq))
}

/// Add `delta_RM1_RM2_radm2`, `delta_RM2_RM3_radm2` and `sum_p1_p2_p3` to a draw.
pub fn converter(params: &ParamMap) -> Result<ParamMap, ParamError> {
    let rm1 = require(params, "RM1_radm2")?;
    let rm2 = require(params, "RM2_radm2")?;
    let rm3 = require(params, "RM3_radm2")?;
    let p_sum = require(params, "fracPol1")? + require(params, "fracPol2")? + require(params, "fracPol3")?;

    let mut out = params.clone();
    out.insert("delta_RM1_RM2_radm2".to_string(), rm1 - rm2);
    out.insert("delta_RM2_RM3_radm2".to_string(), rm2 - rm3);
    out.insert("sum_p1_p2_p3".to_string(), p_sum);
    Ok(out)
}

pub fn priors() -> PriorDict {
    let mut pd = PriorDict::new(converter);

    for (i, label) in [(1, "$p_1$"), (2, "$p_2$"), (3, "$p_3$")] {
        pd.insert(Prior::uniform(&format!("fracPol{i}"), 0.0, 1.0, label));
    }
    for i in 1..=3 {
        pd.insert(
            Prior::uniform(
                &format!("psi0{i}_deg"),
                0.0,
                180.0,
                &format!(r"$\psi_{{0,{i}}}$ (deg)"),
            )
            .with_boundary(Boundary::Periodic),
        );
    }
    for i in 1..=3 {
        pd.insert(Prior::uniform(
            &format!("RM{i}_radm2"),
            -1100.0,
            1100.0,
            &format!(r"$\phi_{i}$ (rad m$^{{-2}}$)"),
        ));
    }

    // Strict RM ordering keeps the three components distinguishable.
    pd.insert(Prior::constraint(
        "delta_RM1_RM2_radm2",
        0.0,
        2200.0,
        r"$\Delta\phi_{1,2}$ (rad m$^{-2}$)",
    ));
    pd.insert(Prior::constraint(
        "delta_RM2_RM3_radm2",
        0.0,
        2200.0,
        r"$\Delta\phi_{2,3}$ (rad m$^{-2}$)",
    ));
    pd.insert(Prior::constraint("sum_p1_p2_p3", 0.0, 1.0, "$p_1+p_2+p_3$"));

    pd
}
