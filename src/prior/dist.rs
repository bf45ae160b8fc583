//! One-dimensional prior distributions.
//!
//! Two kinds exist:
//!
//! - `Uniform`: flat density `1/(max - min)` on the closed interval `[min, max]`.
//! - `Constraint`: never sampled. Its value is derived from other parameters
//!   and a draw is acceptable only if `min < value < max` (open interval).
//!
//! A uniform prior may carry a boundary condition telling the sampler what to
//! do with proposals that leave the interval. Angles use `Periodic`, which wraps
//! into `[min, max)` so that e.g. 180° and 0° are the same point.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PriorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorKind {
    Uniform,
    Constraint,
}

/// Behaviour at the edges of a prior's support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Wrap around: `max` is identified with `min`.
    Periodic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    pub name: String,
    pub latex_label: String,
    pub kind: PriorKind,
    pub minimum: f64,
    pub maximum: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Boundary>,
}

impl Prior {
    pub fn uniform(name: &str, minimum: f64, maximum: f64, latex_label: &str) -> Self {
        Self {
            name: name.to_string(),
            latex_label: latex_label.to_string(),
            kind: PriorKind::Uniform,
            minimum,
            maximum,
            boundary: None,
        }
    }

    pub fn constraint(name: &str, minimum: f64, maximum: f64, latex_label: &str) -> Self {
        Self {
            kind: PriorKind::Constraint,
            ..Self::uniform(name, minimum, maximum, latex_label)
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Check the bounds are usable.
    pub fn validate(&self) -> Result<(), PriorError> {
        if !(self.minimum.is_finite() && self.maximum.is_finite() && self.maximum > self.minimum) {
            return Err(PriorError::InvalidBounds {
                name: self.name.clone(),
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }
        Ok(())
    }

    pub fn is_constraint(&self) -> bool {
        self.kind == PriorKind::Constraint
    }

    pub fn width(&self) -> f64 {
        self.maximum - self.minimum
    }

    /// Whether `value` lies in the support (closed for uniform, open for constraints).
    pub fn is_in_bounds(&self, value: f64) -> bool {
        match self.kind {
            PriorKind::Uniform => value >= self.minimum && value <= self.maximum,
            PriorKind::Constraint => value > self.minimum && value < self.maximum,
        }
    }

    /// Prior density at `value`.
    ///
    /// Constraints are indicator functions: 1 inside, 0 outside.
    pub fn prob(&self, value: f64) -> f64 {
        if !self.is_in_bounds(value) {
            return 0.0;
        }
        match self.kind {
            PriorKind::Uniform => 1.0 / self.width(),
            PriorKind::Constraint => 1.0,
        }
    }

    /// Natural log of [`Prior::prob`]; `-inf` outside the support.
    pub fn ln_prob(&self, value: f64) -> f64 {
        match self.prob(value) {
            p if p > 0.0 => p.ln(),
            _ => f64::NEG_INFINITY,
        }
    }

    /// Map a unit-interval coordinate onto the prior (inverse CDF).
    pub fn rescale(&self, unit: f64) -> f64 {
        self.minimum + unit * self.width()
    }

    /// Draw a value from the prior.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.minimum..self.maximum)
    }

    /// Apply the boundary condition to a proposed value.
    ///
    /// Values without a boundary condition are returned unchanged.
    pub fn wrap(&self, value: f64) -> f64 {
        match self.boundary {
            None => value,
            Some(Boundary::Periodic) => self.minimum + (value - self.minimum).rem_euclid(self.width()),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn psi() -> Prior {
        Prior::uniform("psi01_deg", 0.0, 180.0, "$\\psi_{0,1}$ (deg)").with_boundary(Boundary::Periodic)
    }

    #[test]
    fn uniform_density_is_flat_and_closed() {
        let p = Prior::uniform("fracPol1", 0.0, 1.0, "$p_1$");
        assert_eq!(p.prob(0.0), 1.0);
        assert_eq!(p.prob(0.5), 1.0);
        assert_eq!(p.prob(1.0), 1.0);
        assert_eq!(p.prob(1.0 + 1e-12), 0.0);
        assert_eq!(p.ln_prob(-0.1), f64::NEG_INFINITY);

        let rm = Prior::uniform("RM1_radm2", -1100.0, 1100.0, "");
        assert_abs_diff_eq!(rm.ln_prob(3.0), -(2200.0_f64).ln());
    }

    #[test]
    fn constraint_bounds_are_open() {
        let c = Prior::constraint("sum_p1_p2_p3", 0.0, 1.0, "");
        assert!(c.is_constraint());
        assert!(c.is_in_bounds(0.3));
        assert!(!c.is_in_bounds(0.0));
        assert!(!c.is_in_bounds(1.0));
        assert!(!c.is_in_bounds(1.5));
        assert_eq!(c.prob(0.3), 1.0);
        assert_eq!(c.prob(1.5), 0.0);
    }

    #[test]
    fn periodic_angle_wraps_180_to_0() {
        let p = psi();
        assert_eq!(p.wrap(180.0), 0.0);
        assert_eq!(p.wrap(0.0), 0.0);
        assert_abs_diff_eq!(p.wrap(190.0), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.wrap(-30.0), 150.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.wrap(540.0 + 45.0), 45.0, epsilon = 1e-12);
        // Same density at the identified points.
        assert_eq!(p.prob(180.0), p.prob(0.0));
        assert_eq!(p.prob(p.wrap(180.0)), p.prob(0.0));
    }

    #[test]
    fn unbounded_values_pass_through_wrap() {
        let p = Prior::uniform("RM1_radm2", -1100.0, 1100.0, "");
        assert_eq!(p.wrap(5000.0), 5000.0);
    }

    #[test]
    fn rescale_maps_unit_interval() {
        let p = Prior::uniform("RM1_radm2", -1100.0, 1100.0, "");
        assert_eq!(p.rescale(0.0), -1100.0);
        assert_eq!(p.rescale(0.5), 0.0);
        assert_eq!(p.rescale(1.0), 1100.0);
    }

    #[test]
    fn samples_stay_in_support() {
        let p = psi();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = p.sample(&mut rng);
            assert!((0.0..180.0).contains(&v));
        }
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        assert!(Prior::uniform("x", 0.0, 1.0, "").validate().is_ok());
        assert!(matches!(
            Prior::uniform("x", 1.0, 1.0, "").validate(),
            Err(PriorError::InvalidBounds { .. })
        ));
        assert!(Prior::constraint("x", f64::NAN, 1.0, "").validate().is_err());
    }
}
