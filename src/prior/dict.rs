//! Named, ordered collections of priors with an attached conversion function.
//!
//! A `PriorDict` is what an external sampler consumes:
//!
//! - the non-constraint ("search") keys, in order, define the sampled space
//! - the conversion function adds derived constraint keys to a draw
//! - constraint priors then decide whether that draw is acceptable
//!
//! Rejection of unacceptable draws is the sampler's job; this type only
//! declares the bounds and answers whether a draw satisfies them. The one
//! exception is [`PriorDict::sample`], which draws initial points by simple
//! rejection.

use indexmap::IndexMap;
use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

use crate::domain::ParamMap;
use crate::error::{ParamError, PriorError};
use crate::prior::dist::Prior;

/// Adds derived constraint parameters to a draw. Must be pure and deterministic.
pub type ConversionFn = fn(&ParamMap) -> Result<ParamMap, ParamError>;

/// Upper bound on rejection-sampling attempts per draw.
pub const MAX_SAMPLE_ATTEMPTS: usize = 100_000;

/// Draws per rayon task when estimating the constraint acceptance fraction.
const ACCEPTANCE_CHUNK: usize = 4096;

#[derive(Debug, Clone)]
pub struct PriorDict {
    priors: IndexMap<String, Prior>,
    conversion: ConversionFn,
}

/// Conversion function for dictionaries without derived parameters.
fn identity(params: &ParamMap) -> Result<ParamMap, ParamError> {
    Ok(params.clone())
}

impl Default for PriorDict {
    fn default() -> Self {
        Self::new(identity)
    }
}

impl PriorDict {
    pub fn new(conversion: ConversionFn) -> Self {
        Self {
            priors: IndexMap::new(),
            conversion,
        }
    }

    /// Add (or replace) a prior, keyed by its name.
    pub fn insert(&mut self, prior: Prior) {
        self.priors.insert(prior.name.clone(), prior);
    }

    pub fn get(&self, key: &str) -> Option<&Prior> {
        self.priors.get(key)
    }

    pub fn len(&self) -> usize {
        self.priors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prior> {
        self.priors.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.priors.keys().map(String::as_str)
    }

    /// Sampled (non-constraint) parameter names, in insertion order.
    pub fn search_keys(&self) -> Vec<&str> {
        self.iter()
            .filter(|p| !p.is_constraint())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Derived constraint parameter names, in insertion order.
    pub fn constraint_keys(&self) -> Vec<&str> {
        self.iter()
            .filter(|p| p.is_constraint())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Check every prior has usable bounds.
    pub fn validate(&self) -> Result<(), PriorError> {
        self.iter().try_for_each(Prior::validate)
    }

    /// Apply the conversion function, returning the draw extended with derived keys.
    pub fn convert(&self, params: &ParamMap) -> Result<ParamMap, ParamError> {
        (self.conversion)(params)
    }

    /// Names of the constraint priors the draw violates.
    pub fn violated_constraints(&self, params: &ParamMap) -> Result<Vec<String>, ParamError> {
        let converted = self.convert(params)?;
        let mut out = Vec::new();
        for prior in self.iter().filter(|p| p.is_constraint()) {
            let value = converted
                .get(&prior.name)
                .copied()
                .ok_or_else(|| ParamError::Missing(prior.name.clone()))?;
            if !prior.is_in_bounds(value) {
                trace!("constraint {} violated: {value}", prior.name);
                out.push(prior.name.clone());
            }
        }
        Ok(out)
    }

    /// Whether the draw satisfies every constraint.
    pub fn evaluate_constraints(&self, params: &ParamMap) -> Result<bool, ParamError> {
        Ok(self.violated_constraints(params)?.is_empty())
    }

    /// Joint prior density of the search parameters (0 when a constraint fails).
    ///
    /// This is not renormalised for the volume removed by constraints; see
    /// [`PriorDict::constraint_acceptance`] for that factor.
    pub fn prob(&self, params: &ParamMap) -> Result<f64, ParamError> {
        Ok(self.ln_prob(params)?.exp())
    }

    /// Log of [`PriorDict::prob`]; `-inf` outside the support or when a constraint fails.
    pub fn ln_prob(&self, params: &ParamMap) -> Result<f64, ParamError> {
        let mut ln_p = 0.0;
        for prior in self.iter().filter(|p| !p.is_constraint()) {
            let value = params
                .get(&prior.name)
                .copied()
                .ok_or_else(|| ParamError::Missing(prior.name.clone()))?;
            ln_p += prior.ln_prob(value);
        }
        if ln_p == f64::NEG_INFINITY {
            return Ok(ln_p);
        }
        if !self.evaluate_constraints(params)? {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(ln_p)
    }

    /// Apply boundary conditions (e.g. periodic angles) in place.
    pub fn wrap_periodic(&self, params: &mut ParamMap) {
        for prior in self.iter().filter(|p| p.boundary.is_some()) {
            if let Some(v) = params.get_mut(&prior.name) {
                *v = prior.wrap(*v);
            }
        }
    }

    /// Map a unit-hypercube point onto the search parameters (nested-sampling transform).
    ///
    /// `unit` must have one entry per search key, in [`PriorDict::search_keys`] order.
    pub fn rescale(&self, unit: &[f64]) -> Result<ParamMap, PriorError> {
        let search: Vec<&Prior> = self.iter().filter(|p| !p.is_constraint()).collect();
        if unit.len() != search.len() {
            return Err(PriorError::UnitCubeLength {
                expected: search.len(),
                got: unit.len(),
            });
        }
        Ok(search
            .into_iter()
            .zip(unit)
            .map(|(prior, &u)| (prior.name.clone(), prior.rescale(u)))
            .collect())
    }

    /// Draw the search parameters independently, ignoring constraints.
    fn sample_unconstrained<R: Rng + ?Sized>(&self, rng: &mut R) -> ParamMap {
        self.iter()
            .filter(|p| !p.is_constraint())
            .map(|p| (p.name.clone(), p.sample(rng)))
            .collect()
    }

    /// Draw one point satisfying every constraint.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParamMap, PriorError> {
        for attempt in 1..=MAX_SAMPLE_ATTEMPTS {
            let draw = self.sample_unconstrained(rng);
            if self.evaluate_constraints(&draw)? {
                trace!("prior draw accepted after {attempt} attempt(s)");
                return Ok(draw);
            }
        }
        Err(PriorError::SamplingExhausted(MAX_SAMPLE_ATTEMPTS))
    }

    /// Draw `n` points satisfying every constraint.
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<ParamMap>, PriorError> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.sample(rng)?);
        }
        Ok(out)
    }

    /// Monte-Carlo estimate of the fraction of unconstrained draws that pass the constraints.
    ///
    /// Dividing [`PriorDict::prob`] by this factor normalises the constrained prior.
    /// Work is split into fixed-size chunks seeded from `seed`, so the result is
    /// deterministic regardless of thread count. A failing conversion aborts the
    /// estimate.
    pub fn constraint_acceptance(&self, seed: u64, n_draws: usize) -> Result<f64, PriorError> {
        if n_draws == 0 {
            return Ok(f64::NAN);
        }
        if self.constraint_keys().is_empty() {
            return Ok(1.0);
        }

        let n_chunks = n_draws.div_ceil(ACCEPTANCE_CHUNK);
        let per_chunk = (0..n_chunks)
            .into_par_iter()
            .map(|chunk| -> Result<usize, PriorError> {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk as u64));
                let len = ACCEPTANCE_CHUNK.min(n_draws - chunk * ACCEPTANCE_CHUNK);
                let mut accepted = 0;
                for _ in 0..len {
                    let draw = self.sample_unconstrained(&mut rng);
                    if self.evaluate_constraints(&draw)? {
                        accepted += 1;
                    }
                }
                Ok(accepted)
            })
            .collect::<Result<Vec<usize>, PriorError>>()?;
        let accepted: usize = per_chunk.into_iter().sum();

        let frac = accepted as f64 / n_draws as f64;
        debug!("constraint acceptance: {accepted}/{n_draws} = {frac:.4}");
        Ok(frac)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::error::AppError;
    use crate::prior::dist::Boundary;

    fn sum_converter(params: &ParamMap) -> Result<ParamMap, ParamError> {
        let a = params.get("a").copied().ok_or_else(|| ParamError::Missing("a".into()))?;
        let b = params.get("b").copied().ok_or_else(|| ParamError::Missing("b".into()))?;
        let mut out = params.clone();
        out.insert("sum_ab".to_string(), a + b);
        Ok(out)
    }

    fn toy() -> PriorDict {
        let mut d = PriorDict::new(sum_converter);
        d.insert(Prior::uniform("a", 0.0, 1.0, "$a$"));
        d.insert(Prior::uniform("b", 0.0, 1.0, "$b$"));
        d.insert(Prior::uniform("angle", 0.0, 180.0, "").with_boundary(Boundary::Periodic));
        d.insert(Prior::constraint("sum_ab", 0.0, 1.0, "$a+b$"));
        d
    }

    fn draw(a: f64, b: f64, angle: f64) -> ParamMap {
        [("a", a), ("b", b), ("angle", angle)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn keys_split_search_and_constraint() {
        let d = toy();
        assert_eq!(d.len(), 4);
        assert_eq!(d.search_keys(), vec!["a", "b", "angle"]);
        assert_eq!(d.constraint_keys(), vec!["sum_ab"]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn ln_prob_sums_and_respects_constraints() {
        let d = toy();
        let ok = draw(0.2, 0.3, 90.0);
        assert_abs_diff_eq!(d.ln_prob(&ok).unwrap(), -(180.0_f64).ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(d.prob(&ok).unwrap(), 1.0 / 180.0, epsilon = 1e-15);

        let bad = draw(0.7, 0.6, 90.0);
        assert_eq!(d.ln_prob(&bad).unwrap(), f64::NEG_INFINITY);
        assert_eq!(d.violated_constraints(&bad).unwrap(), vec!["sum_ab".to_string()]);

        let out_of_range = draw(1.2, 0.0, 90.0);
        assert_eq!(d.ln_prob(&out_of_range).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn missing_key_is_reported() {
        let d = toy();
        let mut p = draw(0.1, 0.1, 0.0);
        p.shift_remove("b");
        assert_eq!(d.ln_prob(&p), Err(ParamError::Missing("b".to_string())));
    }

    #[test]
    fn wrap_periodic_only_touches_bounded_keys() {
        let d = toy();
        let mut p = draw(0.1, 0.2, 200.0);
        d.wrap_periodic(&mut p);
        assert_abs_diff_eq!(p["angle"], 20.0, epsilon = 1e-12);
        assert_eq!(p["a"], 0.1);
    }

    #[test]
    fn rescale_follows_search_order() {
        let d = toy();
        let p = d.rescale(&[0.5, 0.25, 1.0]).unwrap();
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["a", "b", "angle"]);
        assert_eq!(p["a"], 0.5);
        assert_eq!(p["b"], 0.25);
        assert_eq!(p["angle"], 180.0);
        assert!(matches!(
            d.rescale(&[0.5]),
            Err(PriorError::UnitCubeLength { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn samples_satisfy_constraints() {
        let d = toy();
        let mut rng = StdRng::seed_from_u64(1);
        let draws = d.sample_n(&mut rng, 200).unwrap();
        assert_eq!(draws.len(), 200);
        for p in &draws {
            assert!(p["a"] + p["b"] < 1.0);
            assert!(!p.contains_key("sum_ab"));
            assert!(d.ln_prob(p).unwrap().is_finite());
        }
    }

    #[test]
    fn impossible_constraint_exhausts() {
        let mut d = toy();
        d.insert(Prior::constraint("sum_ab", 5.0, 6.0, ""));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            d.sample(&mut rng),
            Err(PriorError::SamplingExhausted(MAX_SAMPLE_ATTEMPTS))
        );
    }

    #[test]
    fn acceptance_is_deterministic_and_close_to_half() {
        // a + b < 1 on the unit square has area 1/2.
        let d = toy();
        let f1 = d.constraint_acceptance(42, 20_000).unwrap();
        let f2 = d.constraint_acceptance(42, 20_000).unwrap();
        assert_eq!(f1, f2);
        assert_abs_diff_eq!(f1, 0.5, epsilon = 0.02);
        assert_eq!(PriorDict::default().constraint_acceptance(1, 10).unwrap(), 1.0);
    }

    fn needs_c(params: &ParamMap) -> Result<ParamMap, ParamError> {
        let c = params.get("c").copied().ok_or_else(|| ParamError::Missing("c".into()))?;
        let mut out = params.clone();
        out.insert("twice_c".to_string(), 2.0 * c);
        Ok(out)
    }

    #[test]
    fn failing_conversion_is_reported_not_rejected() {
        let mut d = PriorDict::new(needs_c);
        d.insert(Prior::uniform("a", 0.0, 1.0, ""));
        d.insert(Prior::constraint("twice_c", 0.0, 1.0, ""));
        let missing = ParamError::Missing("c".to_string());

        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(d.sample(&mut rng), Err(PriorError::Conversion(missing.clone())));
        assert_eq!(
            d.constraint_acceptance(3, 100),
            Err(PriorError::Conversion(missing.clone()))
        );
        assert_eq!(
            AppError::from(d.sample(&mut rng).unwrap_err()).exit_code(),
            2
        );
    }
}
