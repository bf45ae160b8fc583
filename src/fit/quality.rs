//! Goodness-of-fit and information criteria for a parameter set.
//!
//! For `n` real data values (two per channel) and `k` free parameters:
//! - χ² = Σ residual²/σ²
//! - χ²_red = χ² / (n - k)
//! - AIC = 2k - 2 ln L
//! - BIC = k ln(n) - 2 ln L
//!
//! Comparison rule when ranking models on the same data:
//! 1. Lower BIC is better
//! 2. If ΔBIC < 2 against a simpler model, prefer the simpler model

use std::cmp::Ordering;

use crate::domain::{FitQuality, ModelKind, ParamMap, QuData};
use crate::error::ParamError;
use crate::fit::likelihood::residual_sums;

/// BIC differences below this are not considered meaningful.
const BIC_TIE: f64 = 2.0;

/// Evaluate fit diagnostics for `params` under `model`.
pub fn evaluate_quality(model: ModelKind, params: &ParamMap, data: &QuData) -> Result<FitQuality, ParamError> {
    let sums = residual_sums(model, params, data)?;

    let n = 2 * data.n_chan();
    let k = model.param_count();
    let ln_likelihood = -0.5 * (sums.chi_sq + sums.ln_norm);
    let chi_sq_red = if n > k {
        sums.chi_sq / (n - k) as f64
    } else {
        f64::NAN
    };

    Ok(FitQuality {
        model,
        n,
        k,
        chi_sq: sums.chi_sq,
        chi_sq_red,
        ln_likelihood,
        aic: 2.0 * k as f64 - 2.0 * ln_likelihood,
        bic: k as f64 * (n as f64).ln() - 2.0 * ln_likelihood,
    })
}

/// Pick the preferred candidate by BIC, breaking near-ties toward fewer parameters.
pub fn select_by_bic(fits: &[FitQuality]) -> Option<&FitQuality> {
    let mut best = fits
        .iter()
        .filter(|f| f.bic.is_finite())
        .min_by(|a, b| a.bic.partial_cmp(&b.bic).unwrap_or(Ordering::Equal))?;

    for f in fits.iter().filter(|f| f.bic.is_finite()) {
        if f.k < best.k && (f.bic - best.bic) < BIC_TIE {
            best = f;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::models::{M6Params, M111Params, evaluate};

    fn data() -> QuData {
        let lam_sq: Vec<f64> = (0..40).map(|i| 0.03 + 0.002 * i as f64).collect();
        let truth = M111Params {
            frac_pol1: 0.2,
            frac_pol2: 0.1,
            frac_pol3: 0.0,
            psi01_deg: 20.0,
            psi02_deg: 60.0,
            psi03_deg: 0.0,
            rm1_radm2: 80.0,
            rm2_radm2: -30.0,
            rm3_radm2: -100.0,
        };
        let qu = evaluate(ModelKind::M111, &truth.to_param_map(), &lam_sq).unwrap();
        QuData {
            freq_hz: vec![1.0e9; lam_sq.len()],
            q: qu.iter().map(|c| c.re + 0.001).collect(),
            u: qu.iter().map(|c| c.im - 0.001).collect(),
            dq: vec![0.01; lam_sq.len()],
            du: vec![0.01; lam_sq.len()],
            lam_sq,
        }
    }

    fn quality(model: ModelKind, bic: f64) -> FitQuality {
        FitQuality {
            model,
            n: 100,
            k: model.param_count(),
            chi_sq: 0.0,
            chi_sq_red: 0.0,
            ln_likelihood: 0.0,
            aic: 0.0,
            bic,
        }
    }

    #[test]
    fn quality_uses_constant_offsets() {
        let truth = M111Params {
            frac_pol1: 0.2,
            frac_pol2: 0.1,
            frac_pol3: 0.0,
            psi01_deg: 20.0,
            psi02_deg: 60.0,
            psi03_deg: 0.0,
            rm1_radm2: 80.0,
            rm2_radm2: -30.0,
            rm3_radm2: -100.0,
        };
        let d = data();
        let q = evaluate_quality(ModelKind::M111, &truth.to_param_map(), &d).unwrap();
        assert_eq!(q.n, 80);
        assert_eq!(q.k, 9);
        // Every residual is 0.001 / 0.01 = 0.1 sigma.
        assert_abs_diff_eq!(q.chi_sq, 80.0 * 0.01, epsilon = 1e-9);
        assert_abs_diff_eq!(q.chi_sq_red, 0.8 / 71.0, epsilon = 1e-9);
        assert_abs_diff_eq!(q.bic - q.aic, 9.0 * 80f64.ln() - 18.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_counts_give_nan_reduced_chi_sq() {
        let d = QuData {
            freq_hz: vec![1.0e9; 2],
            lam_sq: vec![0.05, 0.06],
            q: vec![0.0; 2],
            u: vec![0.0; 2],
            dq: vec![0.1; 2],
            du: vec![0.1; 2],
        };
        let p = M6Params {
            frac_pol1: 0.1,
            frac_pol2: 0.1,
            psi01_deg: 0.0,
            psi02_deg: 0.0,
            rm1_radm2: 10.0,
            rm2_radm2: 0.0,
            delta_rm1_radm2: 1.0,
            delta_rm2_radm2: 1.0,
        };
        let q = evaluate_quality(ModelKind::M6, &p.to_param_map(), &d).unwrap();
        assert!(q.chi_sq_red.is_nan());
        assert!(q.bic.is_finite());
    }

    #[test]
    fn bic_prefers_simpler_when_close() {
        let fits = vec![quality(ModelKind::M111, 11.5), quality(ModelKind::M6, 10.0)];
        assert_eq!(select_by_bic(&fits).unwrap().model, ModelKind::M6);

        // M6 (8 params) is simpler than M111 (9 params); a near-tie favours it.
        let fits = vec![quality(ModelKind::M111, 10.0), quality(ModelKind::M6, 11.0)];
        assert_eq!(select_by_bic(&fits).unwrap().model, ModelKind::M6);

        let fits = vec![quality(ModelKind::M111, 10.0), quality(ModelKind::M6, 20.0)];
        assert_eq!(select_by_bic(&fits).unwrap().model, ModelKind::M111);
    }

    #[test]
    fn bic_selection_skips_non_finite() {
        assert!(select_by_bic(&[]).is_none());
        let fits = vec![quality(ModelKind::M6, f64::NAN), quality(ModelKind::M111, 5.0)];
        assert_eq!(select_by_bic(&fits).unwrap().model, ModelKind::M111);
    }
}
