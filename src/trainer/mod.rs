//! Perceptron training loop
//!
//! The trainer walks the dataset in order, classifying each point with the
//! current hypothesis `w` and correcting `w` according to the configured
//! [`UpdateRule`]. A run converges when a full pass leaves every component of
//! `w` exactly unchanged.
//!
//! With [`UpdateRule::Observed`] the correction is `-c * (label + y)`, which is
//! zero on misclassified points and `∓2c` on correct ones. That is the
//! classical rule applied to negated labels, so on separable data it settles
//! on a hyperplane that classifies every training point as the opposite
//! class. [`UpdateRule::Textbook`] uses `c * (label - y)` and settles on a
//! hyperplane that agrees with every label.

use crate::core::{
    Dataset, Frame, Granularity, Hyperplane, Label, PerceptronError, Point, RenderStatus, Result,
    TrainerConfig, TrainingObserver, UpdateRule,
};
use crate::geometry::classify;
use log::{debug, info, warn};
use rand::Rng;

/// Result of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    /// Ground-truth hyperplane, unchanged
    pub w_star: Hyperplane,
    /// Final hypothesis weights
    pub weights: Hyperplane,
    /// Number of completed passes over the dataset
    pub epochs: usize,
    /// Number of point visits that applied a non-zero correction
    pub updates: usize,
    /// Whether the last pass left the weights unchanged
    pub converged: bool,
}

/// Perceptron trainer
pub struct PerceptronTrainer {
    config: TrainerConfig,
}

impl PerceptronTrainer {
    /// Create a new trainer with the given configuration
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Get the trainer configuration
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train from weights drawn uniformly from `[0, 1)`
    pub fn train<R: Rng>(
        &self,
        dataset: &Dataset,
        w_star: &Hyperplane,
        rng: &mut R,
        observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<TrainingOutcome> {
        let initial = Hyperplane::new((0..w_star.len()).map(|_| rng.gen::<f64>()).collect());
        self.train_from(dataset, w_star, initial, observer)
    }

    /// Train starting from caller-supplied weights
    pub fn train_from(
        &self,
        dataset: &Dataset,
        w_star: &Hyperplane,
        initial: Hyperplane,
        observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<TrainingOutcome> {
        self.validate(dataset, w_star, &initial)?;

        let c = self.config.training_rate;
        let rule = self.config.update_rule;
        let mut notifier = Notifier::new(observer);
        let mut weights = initial;
        let mut epochs = 0;
        let mut updates = 0;
        let mut converged = false;

        debug!(
            "Starting {:?} training: c={}, n={}, dim={}, w={}",
            rule,
            c,
            dataset.len(),
            dataset.dim(),
            weights
        );

        loop {
            if self.config.max_epochs.is_some_and(|max| epochs >= max) {
                break;
            }

            let w_epoch = weights.clone();

            for point in dataset {
                let y = classify(point, &weights).ok_or(PerceptronError::DimensionMismatch {
                    expected: weights.dim(),
                    actual: point.dim(),
                })?;

                if apply_update(&mut weights, point, y, c, rule) {
                    updates += 1;
                }

                if self.config.granularity == Granularity::Point {
                    notifier.notify(Frame {
                        dataset,
                        weights: &weights,
                        w_star,
                        focus: Some(point),
                        epoch: epochs,
                        options: &self.config.render,
                        flash_count: None,
                    });
                }
            }

            if self.config.granularity == Granularity::Epoch {
                notifier.notify(Frame {
                    dataset,
                    weights: &weights,
                    w_star,
                    focus: None,
                    epoch: epochs,
                    options: &self.config.render,
                    flash_count: None,
                });
            }

            epochs += 1;

            if w_epoch == weights {
                converged = true;
                break;
            }
            debug!("Epoch {epochs}: w={weights}");
        }

        if converged {
            info!("Converged after {epochs} epochs ({updates} corrections): w={weights}");
            if self.config.render.flash_count > 0 {
                notifier.notify(Frame {
                    dataset,
                    weights: &weights,
                    w_star,
                    focus: None,
                    epoch: epochs.saturating_sub(1),
                    options: &self.config.render,
                    flash_count: Some(self.config.render.flash_count),
                });
            }
        } else {
            warn!("Stopped after {epochs} epochs without converging: w={weights}");
        }

        Ok(TrainingOutcome {
            w_star: w_star.clone(),
            weights,
            epochs,
            updates,
            converged,
        })
    }

    fn validate(&self, dataset: &Dataset, w_star: &Hyperplane, initial: &Hyperplane) -> Result<()> {
        let c = self.config.training_rate;
        if !(c.is_finite() && c > 0.0) {
            return Err(PerceptronError::InvalidParameter(format!(
                "training rate must be a positive finite number, got: {c}"
            )));
        }

        if dataset.is_empty() {
            return Err(PerceptronError::EmptyDataset);
        }

        for hyperplane in [w_star, initial] {
            if hyperplane.dim() != dataset.dim() {
                return Err(PerceptronError::DimensionMismatch {
                    expected: dataset.dim(),
                    actual: hyperplane.dim(),
                });
            }
        }

        if let Some((index, point)) = dataset
            .iter()
            .enumerate()
            .find(|(_, p)| !p.label().is_classified())
        {
            return Err(PerceptronError::InvalidLabel {
                index,
                value: point.label().value(),
            });
        }

        Ok(())
    }
}

/// Apply one weight correction for `point` classified as `y`
///
/// Returns whether the correction term was non-zero.
pub fn apply_update(
    weights: &mut Hyperplane,
    point: &Point,
    y: Label,
    c: f64,
    rule: UpdateRule,
) -> bool {
    let label = point.label().as_f64();
    let y = y.as_f64();
    let w = weights.as_mut_slice();

    match rule {
        UpdateRule::Observed => {
            let term = c * (label + y);
            w[0] -= term;
            for (wk, xk) in w[1..].iter_mut().zip(point.coordinates()) {
                *wk -= term * xk;
            }
            term != 0.0
        }
        UpdateRule::Textbook => {
            let term = c * (label - y);
            w[0] += term;
            for (wk, xk) in w[1..].iter_mut().zip(point.coordinates()) {
                *wk += term * xk;
            }
            term != 0.0
        }
    }
}

/// Forwards frames to an optional observer and reports failed renders once
struct Notifier<'o> {
    observer: Option<&'o mut dyn TrainingObserver>,
    warned: bool,
}

impl<'o> Notifier<'o> {
    fn new(observer: Option<&'o mut dyn TrainingObserver>) -> Self {
        Self {
            observer,
            warned: false,
        }
    }

    fn notify(&mut self, frame: Frame<'_>) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let status = observer.observe(&frame);
        if status != RenderStatus::Rendered && !self.warned {
            warn!(
                "Observer returned status {} at epoch {}; continuing",
                status.code(),
                frame.epoch
            );
            self.warned = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GeneratorConfig, RenderOptions};
    use crate::generator::generate;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(rule: UpdateRule, c: f64) -> TrainerConfig {
        TrainerConfig {
            training_rate: c,
            update_rule: rule,
            ..TrainerConfig::default()
        }
    }

    fn separable_2d() -> (Dataset, Hyperplane) {
        let points = vec![
            Point::labeled(vec![0.8, 0.6], Label::Positive),
            Point::labeled(vec![-0.7, -0.5], Label::Negative),
            Point::labeled(vec![0.5, 0.9], Label::Positive),
            Point::labeled(vec![-0.4, -0.9], Label::Negative),
            Point::labeled(vec![0.9, -0.1], Label::Positive),
            Point::labeled(vec![-0.9, 0.2], Label::Negative),
        ];
        let dataset = Dataset::new(2, points).unwrap();
        (dataset, Hyperplane::new(vec![0.0, 1.0, 1.0]))
    }

    #[test]
    fn test_observed_rule_zero_update_on_misclassified() {
        // w = 0 classifies (1, 1) as -1; label +1 gives (1 + -1) = 0
        let mut w = Hyperplane::zeros(2);
        let p = Point::labeled(vec![1.0, 1.0], Label::Positive);
        let y = classify(&p, &w).unwrap();
        assert_eq!(y, Label::Negative);

        let changed = apply_update(&mut w, &p, y, 0.1, UpdateRule::Observed);
        assert!(!changed);
        assert_eq!(w.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_observed_rule_moves_on_correct_point() {
        let mut w = Hyperplane::new(vec![0.0, 1.0, 1.0]);
        let p = Point::labeled(vec![1.0, 0.5], Label::Positive);
        let y = classify(&p, &w).unwrap();
        assert_eq!(y, Label::Positive);

        // term = 0.1 * (1 + 1) = 0.2
        assert!(apply_update(&mut w, &p, y, 0.1, UpdateRule::Observed));
        assert_relative_eq!(w.as_slice()[0], -0.2);
        assert_relative_eq!(w.as_slice()[1], 0.8);
        assert_relative_eq!(w.as_slice()[2], 0.9);
    }

    #[test]
    fn test_textbook_rule() {
        let p = Point::labeled(vec![1.0, 1.0], Label::Positive);

        let mut w = Hyperplane::zeros(2);
        // Misclassified: term = 0.1 * (1 - -1) = 0.2
        assert!(apply_update(&mut w, &p, Label::Negative, 0.1, UpdateRule::Textbook));
        assert_relative_eq!(w.as_slice()[0], 0.2);
        assert_relative_eq!(w.as_slice()[1], 0.2);
        assert_relative_eq!(w.as_slice()[2], 0.2);

        // Correct: no change
        let before = w.clone();
        assert!(!apply_update(&mut w, &p, Label::Positive, 0.1, UpdateRule::Textbook));
        assert_eq!(w, before);
    }

    #[test]
    fn test_single_pass_two_points_by_hand() {
        let dataset = Dataset::new(
            2,
            vec![
                Point::labeled(vec![1.0, 1.0], Label::Positive),
                Point::labeled(vec![-1.0, 0.0], Label::Negative),
            ],
        )
        .unwrap();
        let w_star = Hyperplane::new(vec![0.0, 1.0, 1.0]);
        let mut trainer_config = config(UpdateRule::Observed, 0.1);
        trainer_config.max_epochs = Some(1);

        let outcome = PerceptronTrainer::new(trainer_config)
            .train_from(&dataset, &w_star, Hyperplane::zeros(2), None)
            .unwrap();

        // Point 1: y = -1, term 0, w stays 0.
        // Point 2: dot = 0 so y = -1 = label, term = 0.1 * -2 = -0.2
        //   w0 = 0.2, w1 = 0 - (-0.2 * -1) = -0.2, w2 = 0
        assert_eq!(outcome.epochs, 1);
        assert_eq!(outcome.updates, 1);
        assert!(!outcome.converged);
        assert_relative_eq!(outcome.weights.as_slice()[0], 0.2);
        assert_relative_eq!(outcome.weights.as_slice()[1], -0.2);
        assert_relative_eq!(outcome.weights.as_slice()[2], 0.0);
    }

    #[test]
    fn test_textbook_converges_and_separates() {
        let (dataset, w_star) = separable_2d();
        let mut rng = StdRng::seed_from_u64(17);
        let mut trainer_config = config(UpdateRule::Textbook, 0.1);
        trainer_config.max_epochs = Some(10_000);

        let outcome = PerceptronTrainer::new(trainer_config)
            .train(&dataset, &w_star, &mut rng, None)
            .unwrap();

        assert!(outcome.converged);
        assert_eq!(outcome.w_star, w_star);
        for point in &dataset {
            assert_eq!(classify(point, &outcome.weights), Some(point.label()));
        }
    }

    #[test]
    fn test_observed_converges_to_flipped_labels() {
        let (dataset, w_star) = separable_2d();
        let mut rng = StdRng::seed_from_u64(17);
        let mut trainer_config = config(UpdateRule::Observed, 0.1);
        trainer_config.max_epochs = Some(10_000);

        let outcome = PerceptronTrainer::new(trainer_config)
            .train(&dataset, &w_star, &mut rng, None)
            .unwrap();

        assert!(outcome.converged);
        for point in &dataset {
            assert_eq!(
                classify(point, &outcome.weights),
                Some(point.label().opposite())
            );
        }
    }

    #[test]
    fn test_epoch_cap_prevents_hang() {
        let mut rng = StdRng::seed_from_u64(99);
        let (dataset, w_star) = generate(&GeneratorConfig::new(50, 0.0001, 3), &mut rng).unwrap();
        let mut trainer_config = config(UpdateRule::Observed, 0.001);
        trainer_config.max_epochs = Some(5);

        let outcome = PerceptronTrainer::new(trainer_config)
            .train(&dataset, &w_star, &mut rng, None)
            .unwrap();
        assert!(outcome.epochs <= 5);
    }

    #[test]
    fn test_validation_errors() {
        let (dataset, w_star) = separable_2d();
        let trainer = PerceptronTrainer::new(config(UpdateRule::Observed, 0.0));
        assert!(matches!(
            trainer.train_from(&dataset, &w_star, Hyperplane::zeros(2), None),
            Err(PerceptronError::InvalidParameter(_))
        ));

        let trainer = PerceptronTrainer::new(config(UpdateRule::Observed, 0.1));
        assert!(matches!(
            trainer.train_from(&dataset, &Hyperplane::zeros(3), Hyperplane::zeros(2), None),
            Err(PerceptronError::DimensionMismatch { expected: 2, actual: 3 })
        ));

        let empty = Dataset::new(2, Vec::new()).unwrap();
        assert!(matches!(
            trainer.train_from(&empty, &w_star, Hyperplane::zeros(2), None),
            Err(PerceptronError::EmptyDataset)
        ));

        let unlabeled = Dataset::new(
            1,
            vec![
                Point::labeled(vec![1.0], Label::Positive),
                Point::new(vec![-1.0]),
            ],
        )
        .unwrap();
        assert!(matches!(
            trainer.train_from(&unlabeled, &Hyperplane::zeros(1), Hyperplane::zeros(1), None),
            Err(PerceptronError::InvalidLabel { index: 1, value: 0 })
        ));
    }

    #[test]
    fn test_observer_granularity() {
        let (dataset, w_star) = separable_2d();

        let mut epoch_frames = 0usize;
        let mut count_epochs = |frame: &Frame<'_>| {
            assert!(frame.focus.is_none());
            epoch_frames += 1;
            RenderStatus::Rendered
        };
        let mut trainer_config = config(UpdateRule::Textbook, 0.1);
        trainer_config.max_epochs = Some(3);
        let outcome = PerceptronTrainer::new(trainer_config.clone())
            .train_from(&dataset, &w_star, Hyperplane::zeros(2), Some(&mut count_epochs))
            .unwrap();
        assert_eq!(epoch_frames, outcome.epochs);

        let mut point_frames = 0usize;
        let mut count_points = |frame: &Frame<'_>| {
            assert!(frame.focus.is_some());
            point_frames += 1;
            RenderStatus::Rendered
        };
        trainer_config.granularity = Granularity::Point;
        let outcome = PerceptronTrainer::new(trainer_config)
            .train_from(&dataset, &w_star, Hyperplane::zeros(2), Some(&mut count_points))
            .unwrap();
        assert_eq!(point_frames, outcome.epochs * dataset.len());
    }

    #[test]
    fn test_failed_render_does_not_change_training() {
        let (dataset, w_star) = separable_2d();
        let trainer_config = TrainerConfig {
            max_epochs: Some(10_000),
            ..config(UpdateRule::Textbook, 0.1)
        };

        let mut failing = |_: &Frame<'_>| RenderStatus::DimensionMismatch;
        let with_failures = PerceptronTrainer::new(trainer_config.clone())
            .train_from(&dataset, &w_star, Hyperplane::zeros(2), Some(&mut failing))
            .unwrap();
        let without = PerceptronTrainer::new(trainer_config)
            .train_from(&dataset, &w_star, Hyperplane::zeros(2), None)
            .unwrap();

        assert_eq!(with_failures, without);
    }

    #[test]
    fn test_flash_frame_on_convergence() {
        let (dataset, w_star) = separable_2d();
        let trainer_config = TrainerConfig {
            max_epochs: Some(10_000),
            render: RenderOptions {
                flash_count: 3,
                ..RenderOptions::default()
            },
            ..config(UpdateRule::Textbook, 0.1)
        };

        let mut flashes = Vec::new();
        let mut record = |frame: &Frame<'_>| {
            if let Some(count) = frame.flash_count {
                flashes.push(count);
            }
            RenderStatus::Rendered
        };
        let outcome = PerceptronTrainer::new(trainer_config)
            .train_from(&dataset, &w_star, Hyperplane::zeros(2), Some(&mut record))
            .unwrap();

        assert!(outcome.converged);
        assert_eq!(flashes, vec![3]);
    }
}
