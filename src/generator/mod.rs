//! Margin-constrained synthetic dataset generation
//!
//! A ground-truth hyperplane `w_star` is drawn at random, then candidate
//! points are rejection-sampled until `n` of them lie further than `gamma`
//! from it. Every accepted point is labeled by `w_star`, so the result is
//! linearly separable with a known margin.

use crate::core::{
    BiasPolicy, Dataset, GeneratorConfig, Hyperplane, PerceptronError, Point, Result,
};
use crate::geometry::{classify_and_label, distance_to_hyperplane};
use log::{debug, info};
use rand::Rng;

/// Generates labeled datasets from a [`GeneratorConfig`]
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    config: GeneratorConfig,
}

impl DatasetGenerator {
    /// Create a generator with the given configuration
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Get the generator configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a dataset and the hyperplane that labels it
    ///
    /// With `max_attempts` unset this loops until `n` points are accepted.
    /// For a large `gamma` relative to `scale` the acceptance probability
    /// approaches zero and the call may not return in bounded time.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<(Dataset, Hyperplane)> {
        self.validate()?;

        let GeneratorConfig {
            n,
            gamma,
            dimensionality,
            scale,
            ..
        } = self.config;

        let w_star = self.draw_w_star(rng);
        debug!("Drew w_star = {w_star}");

        let mut accepted = Vec::with_capacity(n);
        let mut attempts = 0usize;
        while accepted.len() < n {
            if let Some(limit) = self.config.max_attempts {
                if attempts >= limit {
                    return Err(PerceptronError::GenerationExhausted {
                        accepted: accepted.len(),
                        attempts,
                    });
                }
            }
            attempts += 1;

            let candidate = Point::new(uniform_vector(rng, dimensionality, scale));
            if distance_to_hyperplane(&candidate, &w_star).is_some_and(|d| d > gamma) {
                accepted.push(candidate);
            }
        }

        let points = accepted
            .into_iter()
            .map(|p| classify_and_label(p, &w_star))
            .collect::<Option<Vec<_>>>()
            .ok_or(PerceptronError::DimensionMismatch {
                expected: w_star.dim(),
                actual: dimensionality,
            })?;

        info!(
            "Generated {} points in {} dimensions (gamma={}, {} candidates drawn)",
            n, dimensionality, gamma, attempts
        );

        Ok((Dataset::new(dimensionality, points)?, w_star))
    }

    fn validate(&self) -> Result<()> {
        if self.config.dimensionality == 0 {
            return Err(PerceptronError::InvalidParameter(
                "dimensionality must be at least 1".to_string(),
            ));
        }
        if !(self.config.scale.is_finite() && self.config.scale > 0.0) {
            return Err(PerceptronError::InvalidParameter(format!(
                "scale must be a positive finite number, got: {}",
                self.config.scale
            )));
        }
        // The width of [-scale, scale] must stay finite
        if self.config.scale > f64::MAX / 2.0 {
            return Err(PerceptronError::InvalidParameter(format!(
                "scale too large, must be at most {}, got: {}",
                f64::MAX / 2.0,
                self.config.scale
            )));
        }
        if self.config.gamma.is_nan() {
            return Err(PerceptronError::InvalidParameter(
                "gamma must not be NaN".to_string(),
            ));
        }
        Ok(())
    }

    fn draw_w_star<R: Rng>(&self, rng: &mut R) -> Hyperplane {
        let mut weights = uniform_vector(rng, self.config.dimensionality + 1, self.config.scale);
        if self.config.bias_policy == BiasPolicy::ThroughOrigin {
            weights[0] = 0.0;
        }
        Hyperplane::new(weights)
    }
}

/// Convenience wrapper: generate with a one-off [`DatasetGenerator`]
pub fn generate<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Result<(Dataset, Hyperplane)> {
    DatasetGenerator::new(config.clone()).generate(rng)
}

/// Vector of `len` values drawn independently from `[-scale, scale]`
fn uniform_vector<R: Rng>(rng: &mut R, len: usize, scale: f64) -> Vec<f64> {
    (0..len).map(|_| scale * rng.gen_range(-1.0..=1.0)).collect()
}
