//! Channel grids.
//!
//! Observations come as frequencies; the models are functions of `λ² = (c/ν)²`.

use crate::error::AppError;

/// Speed of light in vacuum [m/s].
pub const C_LIGHT_M_S: f64 = 2.997_924_58e8;

/// Convert frequencies [Hz] to wavelength-squared [m²].
pub fn lambda_sq_from_freq(freq_hz: &[f64]) -> Vec<f64> {
    freq_hz
        .iter()
        .map(|&nu| {
            let lam = C_LIGHT_M_S / nu;
            lam * lam
        })
        .collect()
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid range: min={min}, max={max} (must be finite and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Channel count must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    // Pin the last point exactly; accumulated rounding can leave it a few ulps short.
    out[steps - 1] = max;
    Ok(out)
}

/// Evenly spaced frequency channels, validated to be positive.
pub fn freq_channels(freq_min_hz: f64, freq_max_hz: f64, n_chan: usize) -> Result<Vec<f64>, AppError> {
    if !(freq_min_hz > 0.0) {
        return Err(AppError::new(
            2,
            format!("Frequencies must be > 0 Hz (got min={freq_min_hz})."),
        ));
    }
    lin_space(freq_min_hz, freq_max_hz, n_chan)
}
