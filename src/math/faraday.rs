//! Faraday-rotation building blocks shared by the QU models.
//!
//! A single Faraday-thin component with fractional polarization `p`, intrinsic
//! angle `ψ0` and rotation measure `RM` has
//!
//! - `P(λ²) = p · exp(2i (ψ0 + RM λ²))`
//!
//! A Burn slab (uniformly mixed emitting and rotating medium) with mean
//! rotation `RM + ΔRM/2` and total depth `ΔRM` is damped by a sinc envelope:
//!
//! - `P(λ²) = p · exp(2i (ψ0 + (RM + ΔRM/2) λ²)) · sin(ΔRM λ²) / (ΔRM λ²)`
//!
//! Numerical notes:
//! - `sin(x)/x` is 0/0 at `x = 0`. The analytic limit is 1, and for small `x`
//!   we switch to the series `1 - x²/6`, so `ΔRM = 0` or `λ² = 0` yield the
//!   undamped thin-component value instead of NaN.

use num_complex::Complex64;

/// Threshold below which `sinc` uses its series expansion.
const SMALL_X: f64 = 1e-4;

/// Convert degrees to radians.
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Unnormalised sinc, `sin(x)/x`, with the `x → 0` limit handled.
pub fn sinc(x: f64) -> f64 {
    if x.abs() < SMALL_X {
        // Series: sin(x)/x ≈ 1 - x²/6 (next term x⁴/120 is below f64 precision here).
        return 1.0 - (x * x) / 6.0;
    }
    x.sin() / x
}

/// Complex polarization of a Faraday-thin component at one `λ²`.
pub fn thin_component(frac_pol: f64, psi0_deg: f64, rm_radm2: f64, lam_sq: f64) -> Complex64 {
    let angle = 2.0 * (deg_to_rad(psi0_deg) + rm_radm2 * lam_sq);
    Complex64::from_polar(frac_pol, angle)
}

/// Complex polarization of a Burn slab at one `λ²`.
///
/// `rm_radm2` is the rotation measure at the near side of the slab and
/// `delta_rm_radm2` its total Faraday depth.
pub fn burn_slab_component(
    frac_pol: f64,
    psi0_deg: f64,
    rm_radm2: f64,
    delta_rm_radm2: f64,
    lam_sq: f64,
) -> Complex64 {
    let mean_rm = rm_radm2 + 0.5 * delta_rm_radm2;
    thin_component(frac_pol, psi0_deg, mean_rm, lam_sq) * sinc(delta_rm_radm2 * lam_sq)
}
