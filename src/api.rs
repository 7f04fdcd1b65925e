//! High-level API for perceptron experiments
//!
//! This module wires dataset generation and training together behind a
//! builder, and provides evaluation helpers for the resulting hyperplane.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rperceptron::api::Perceptron;
//! use rperceptron::UpdateRule;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 30 points in 2D with a margin of 0.01, step size 0.001
//! let trained = Perceptron::new()
//!     .with_training_rate(0.001)
//!     .with_points(30)
//!     .with_gamma(0.01)
//!     .with_dimensionality(2)
//!     .with_update_rule(UpdateRule::Textbook)
//!     .run_seeded(42, None)?;
//!
//! println!("w* = {}", trained.w_star());
//! println!("w  = {}", trained.weights());
//! println!("Accuracy: {:.2}%", trained.accuracy() * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    BiasPolicy, Dataset, GeneratorConfig, Granularity, Hyperplane, Label, Point, RenderOptions,
    Result, TrainerConfig, TrainingObserver, UpdateRule,
};
use crate::generator::DatasetGenerator;
use crate::geometry::{classify, cosine_similarity};
use crate::trainer::{PerceptronTrainer, TrainingOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// High-level perceptron interface with builder pattern
#[derive(Debug, Clone, Default)]
pub struct Perceptron {
    generator: GeneratorConfig,
    trainer: TrainerConfig,
}

impl Perceptron {
    /// Create a perceptron experiment with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from explicit configurations
    pub fn with_configs(generator: GeneratorConfig, trainer: TrainerConfig) -> Self {
        Self { generator, trainer }
    }

    /// Set the step size `c`
    pub fn with_training_rate(mut self, training_rate: f64) -> Self {
        self.trainer.training_rate = training_rate;
        self
    }

    /// Set the weight correction formula
    pub fn with_update_rule(mut self, update_rule: UpdateRule) -> Self {
        self.trainer.update_rule = update_rule;
        self
    }

    /// Set when the observer is notified
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.trainer.granularity = granularity;
        self
    }

    /// Cap the number of epochs
    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.trainer.max_epochs = Some(max_epochs);
        self
    }

    /// Set the pause forwarded to observers between frames
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.trainer.render.pause = pause;
        self
    }

    /// Replace all rendering options. The render scale follows the data scale
    /// unless set here.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.trainer.render = render;
        self
    }

    /// Set the number of points to generate
    pub fn with_points(mut self, n: usize) -> Self {
        self.generator.n = n;
        self
    }

    /// Set the minimum margin
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.generator.gamma = gamma;
        self
    }

    /// Set the dimensionality of the points
    pub fn with_dimensionality(mut self, dimensionality: usize) -> Self {
        self.generator.dimensionality = dimensionality;
        self
    }

    /// Set the scale of the data and of `w_star`
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.generator.scale = scale;
        self.trainer.render.scale = scale;
        self
    }

    /// Set the bias policy for `w_star`
    pub fn with_bias_policy(mut self, bias_policy: BiasPolicy) -> Self {
        self.generator.bias_policy = bias_policy;
        self
    }

    /// Cap the number of rejection-sampling candidates
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.generator.max_attempts = Some(max_attempts);
        self
    }

    pub fn generator_config(&self) -> &GeneratorConfig {
        &self.generator
    }

    pub fn trainer_config(&self) -> &TrainerConfig {
        &self.trainer
    }

    /// Generate a dataset and its ground-truth hyperplane
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<(Dataset, Hyperplane)> {
        DatasetGenerator::new(self.generator.clone()).generate(rng)
    }

    /// Train on an existing dataset
    pub fn train<R: Rng>(
        &self,
        dataset: Dataset,
        w_star: &Hyperplane,
        rng: &mut R,
        observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<TrainedPerceptron> {
        let trainer = PerceptronTrainer::new(self.trainer.clone());
        let outcome = trainer.train(&dataset, w_star, rng, observer)?;
        Ok(TrainedPerceptron { dataset, outcome })
    }

    /// Generate with `gen_rng`, then train with `train_rng`
    pub fn run<G: Rng, T: Rng>(
        &self,
        gen_rng: &mut G,
        train_rng: &mut T,
        observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<TrainedPerceptron> {
        let (dataset, w_star) = self.generate(gen_rng)?;
        self.train(dataset, &w_star, train_rng, observer)
    }

    /// Run with generation seeded by `seed` and training by `seed + 1`
    ///
    /// The two streams are seeded differently so the initial weights are
    /// independent of the generated data.
    pub fn run_seeded(
        &self,
        seed: u64,
        observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<TrainedPerceptron> {
        let mut gen_rng = StdRng::seed_from_u64(seed);
        let mut train_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        self.run(&mut gen_rng, &mut train_rng, observer)
    }
}

/// Dataset and training outcome of a completed run
#[derive(Debug, Clone)]
pub struct TrainedPerceptron {
    dataset: Dataset,
    outcome: TrainingOutcome,
}

impl TrainedPerceptron {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn w_star(&self) -> &Hyperplane {
        &self.outcome.w_star
    }

    /// Final hypothesis weights
    pub fn weights(&self) -> &Hyperplane {
        &self.outcome.weights
    }

    pub fn outcome(&self) -> &TrainingOutcome {
        &self.outcome
    }

    pub fn converged(&self) -> bool {
        self.outcome.converged
    }

    /// Classify a point with the learned weights
    pub fn predict(&self, point: &Point) -> Option<Label> {
        classify(point, &self.outcome.weights)
    }

    /// Fraction of the training points the learned weights label correctly
    pub fn accuracy(&self) -> f64 {
        self.evaluate(&self.dataset)
    }

    /// Fraction of `dataset` the learned weights label correctly
    pub fn evaluate(&self, dataset: &Dataset) -> f64 {
        self.evaluate_detailed(dataset).accuracy()
    }

    /// Confusion counts of the learned weights against the labels of `dataset`
    pub fn evaluate_detailed(&self, dataset: &Dataset) -> EvaluationMetrics {
        let mut tp = 0; // True positives
        let mut tn = 0; // True negatives
        let mut fp = 0; // False positives
        let mut fn_ = 0; // False negatives

        for point in dataset {
            match (self.predict(point), point.label()) {
                (Some(Label::Positive), Label::Positive) => tp += 1,
                (Some(Label::Negative), Label::Negative) => tn += 1,
                (Some(Label::Positive), Label::Negative) => fp += 1,
                (Some(Label::Negative), Label::Positive) => fn_ += 1,
                _ => {}
            }
        }

        EvaluationMetrics::new(tp, tn, fp, fn_)
    }

    /// Cosine between the learned and ground-truth coefficient vectors
    pub fn alignment(&self) -> Option<f64> {
        cosine_similarity(&self.outcome.weights, &self.outcome.w_star)
    }

    pub fn into_parts(self) -> (Dataset, TrainingOutcome) {
        (self.dataset, self.outcome)
    }
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }
}

/// Preset experiments matching the classic demonstration runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 30 points in 2D, gamma 0.01, c = 0.001
    Planar,
    /// 1000 points in 10D, gamma 0.001, c = 0.001
    Parallel,
    /// 30 points in 3D, gamma 0.01, c = 0.01
    Spatial,
}

impl Preset {
    /// Builder configured for this preset
    pub fn perceptron(self) -> Perceptron {
        let (c, n, gamma, dimensionality) = match self {
            Preset::Planar => (0.001, 30, 0.01, 2),
            Preset::Parallel => (0.001, 1000, 0.001, 10),
            Preset::Spatial => (0.01, 30, 0.01, 3),
        };
        Perceptron::new()
            .with_training_rate(c)
            .with_points(n)
            .with_gamma(gamma)
            .with_dimensionality(dimensionality)
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Generate and train in one call with a fixed seed
    pub fn run(
        training_rate: f64,
        n: usize,
        gamma: f64,
        dimensionality: usize,
        scale: f64,
        seed: u64,
    ) -> Result<TrainedPerceptron> {
        Perceptron::new()
            .with_training_rate(training_rate)
            .with_points(n)
            .with_gamma(gamma)
            .with_dimensionality(dimensionality)
            .with_scale(scale)
            .run_seeded(seed, None)
    }

    /// Same as [`run`] but stops after `max_epochs`
    pub fn run_capped(
        training_rate: f64,
        n: usize,
        gamma: f64,
        dimensionality: usize,
        seed: u64,
        max_epochs: usize,
    ) -> Result<TrainedPerceptron> {
        Perceptron::new()
            .with_training_rate(training_rate)
            .with_points(n)
            .with_gamma(gamma)
            .with_dimensionality(dimensionality)
            .with_max_epochs(max_epochs)
            .run_seeded(seed, None)
    }
}
