//! CSV exports of spectra and prior draws.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts, and `write_qu_csv` output reads straight back through
//! [`crate::io::read_qu_csv`].

use std::fs::File;
use std::io::Write;
use std::path::Path;

use num_complex::Complex64;

use crate::domain::{ParamMap, QuData};
use crate::error::AppError;

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(2, format!("Failed to write export: {e}"))
}

/// Write a fractional QU spectrum (`freq_hz,q,u,dq,du`).
pub fn write_qu_csv(path: &Path, data: &QuData) -> Result<(), AppError> {
    let mut file = create(path, "QU data CSV")?;
    writeln!(file, "freq_hz,q,u,dq,du").map_err(write_err)?;
    for i in 0..data.n_chan() {
        writeln!(
            file,
            "{:.6},{:.10e},{:.10e},{:.10e},{:.10e}",
            data.freq_hz[i], data.q[i], data.u[i], data.dq[i], data.du[i]
        )
        .map_err(write_err)?;
    }
    Ok(())
}

/// Write a model spectrum with its channel grid.
pub fn write_spectrum_csv(
    path: &Path,
    freq_hz: &[f64],
    lam_sq: &[f64],
    spectrum: &[Complex64],
) -> Result<(), AppError> {
    let mut file = create(path, "spectrum CSV")?;
    writeln!(file, "freq_hz,lambda_sq_m2,q,u,p,psi_deg").map_err(write_err)?;
    for ((nu, l2), c) in freq_hz.iter().zip(lam_sq).zip(spectrum) {
        // Polarization angle is half the phase of q + iu, folded into [0, 180).
        let psi_deg = (0.5 * c.arg().to_degrees()).rem_euclid(180.0);
        writeln!(
            file,
            "{:.6},{:.10e},{:.10e},{:.10e},{:.10e},{:.6}",
            nu,
            l2,
            c.re,
            c.im,
            c.norm(),
            psi_deg
        )
        .map_err(write_err)?;
    }
    Ok(())
}

/// Write prior draws, one per row, with the given column order.
pub fn write_draws_csv(path: &Path, columns: &[&str], draws: &[ParamMap]) -> Result<(), AppError> {
    let mut file = create(path, "draws CSV")?;
    writeln!(file, "{}", columns.join(",")).map_err(write_err)?;
    for d in draws {
        let row: Vec<String> = columns
            .iter()
            .map(|c| d.get(*c).map(|v| format!("{v:.10}")).unwrap_or_default())
            .collect();
        writeln!(file, "{}", row.join(",")).map_err(write_err)?;
    }
    Ok(())
}
