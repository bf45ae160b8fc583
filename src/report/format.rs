//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model/prior code stays clean and testable
//! - output changes are localized

use num_complex::Complex64;

use crate::domain::{FitQuality, ModelKind, ParamMap};
use crate::prior::{Boundary, PriorDict, PriorKind};

/// List the available models and their parameters.
pub fn format_model_list() -> String {
    let mut out = String::new();
    for model in ModelKind::ALL {
        out.push_str(&format!("{:<6} {}\n", model.name(), model.display_name()));
        out.push_str(&format!("       params     : {}\n", model.param_names().join(", ")));
        out.push_str(&format!("       constraints: {}\n", model.constraint_names().join(", ")));
    }
    out
}

/// Format a prior specification as a table.
pub fn format_prior_table(model: ModelKind, priors: &PriorDict) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Priors for {} ({}) ===\n", model.name(), model.display_name()));

    out.push_str(
        format!(
            "{:<22} {:<10} {:>10} {:>10} {:<10} {}\n",
            "name", "kind", "min", "max", "boundary", "label"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<22} {:-<10} {:-<10} {:-<10} {:-<10} {:-<5}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for p in priors.iter() {
        let kind = match p.kind {
            PriorKind::Uniform => "uniform",
            PriorKind::Constraint => "constraint",
        };
        let boundary = match p.boundary {
            Some(Boundary::Periodic) => "periodic",
            None => "",
        };
        out.push_str(
            format!(
                "{:<22} {:<10} {:>10} {:>10} {:<10} {}\n",
                truncate(&p.name, 22),
                kind,
                fmt_num(p.minimum),
                fmt_num(p.maximum),
                boundary,
                p.latex_label
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a parameter draw as `name = value` lines.
pub fn format_params(params: &ParamMap) -> String {
    let width = params.keys().map(|k| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (k, v) in params {
        out.push_str(&format!("  {k:<width$} = {v:.6}\n"));
    }
    out
}

/// Summarise a likelihood evaluation.
pub fn format_quality(quality: &FitQuality, ln_prior: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Model {} ===\n", quality.model.name()));
    out.push_str(&format!("Data values : n={} (k={} free params)\n", quality.n, quality.k));
    out.push_str(&format!("ln L        : {:.4}\n", quality.ln_likelihood));
    out.push_str(&format!("ln prior    : {:.4}\n", ln_prior));
    out.push_str(&format!("ln posterior: {:.4}\n", quality.ln_likelihood + ln_prior));
    out.push_str(&format!("chi^2       : {:.4}\n", quality.chi_sq));
    out.push_str(&format!("chi^2 (red.): {:.4}\n", quality.chi_sq_red));
    out.push_str(&format!("AIC         : {:.4}\n", quality.aic));
    out.push_str(&format!("BIC         : {:.4}\n", quality.bic));
    out
}

/// Format the first `max_rows` channels of a spectrum.
pub fn format_spectrum_preview(freq_hz: &[f64], lam_sq: &[f64], spectrum: &[Complex64], max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>12} {:>12} {:>12} {:>12} {:>10}\n", "freq_MHz", "lambda^2", "q", "u", "p").trim_end());
    out.push('\n');

    for ((nu, l2), c) in freq_hz.iter().zip(lam_sq).zip(spectrum).take(max_rows) {
        out.push_str(&format!(
            "{:>12.3} {:>12.6} {:>12.6} {:>12.6} {:>10.6}\n",
            nu / 1e6,
            l2,
            c.re,
            c.im,
            c.norm()
        ));
    }
    if spectrum.len() > max_rows {
        out.push_str(&format!("... ({} more channels)\n", spectrum.len() - max_rows));
    }
    out
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e6 {
        format!("{v:.0}")
    } else {
        format!("{v:.4}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
