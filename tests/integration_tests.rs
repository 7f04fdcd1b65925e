//! Integration tests for the rperceptron library
//!
//! These tests verify end-to-end functionality across generation, geometry
//! and training, and the properties every generated dataset must satisfy.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rperceptron::api::{quick, Perceptron};
use rperceptron::trainer::apply_update;
use rperceptron::{
    classify, distance_to_hyperplane, BiasPolicy, Dataset, DatasetGenerator, Frame,
    GeneratorConfig, Granularity, Hyperplane, Label, PerceptronTrainer, Point, RecordingObserver,
    RenderStatus, TrainerConfig, UpdateRule,
};

/// Every generated point respects the margin and carries the w_star label
#[test]
fn test_generated_dataset_properties() {
    for (seed, dimensionality) in [(1u64, 1usize), (2, 2), (3, 5), (4, 20)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = GeneratorConfig::new(15, 0.01, dimensionality);
        let (dataset, w_star) = DatasetGenerator::new(config)
            .generate(&mut rng)
            .expect("generation should succeed");

        assert_eq!(dataset.len(), 15);
        assert_eq!(dataset.dim(), dimensionality);
        assert_eq!(w_star.dim(), dimensionality);

        for point in &dataset {
            let distance = distance_to_hyperplane(point, &w_star).expect("dimensions agree");
            assert!(
                distance > 0.01,
                "point {:?} too close: {distance}",
                point.coordinates()
            );
            assert_eq!(Some(point.label()), classify(point, &w_star));
        }
    }
}

/// Generation and training both work across dimensionalities
#[test]
fn test_dimensional_generality() {
    for dimensionality in [1, 2, 5, 20] {
        let trained = quick::run_capped(0.01, 10, 0.001, dimensionality, 77, 500)
            .expect("run should succeed");

        assert_eq!(trained.dataset().dim(), dimensionality);
        assert_eq!(trained.weights().len(), dimensionality + 1);
        assert_eq!(trained.w_star().len(), dimensionality + 1);
        assert!(trained.outcome().epochs <= 500);
    }
}

/// Two identically seeded generations are identical
#[test]
fn test_determinism_under_fixed_seed() {
    let config = GeneratorConfig {
        bias_policy: BiasPolicy::ThroughOrigin,
        ..GeneratorConfig::new(40, 0.02, 3)
    };
    let generator = DatasetGenerator::new(config);

    let (first_data, first_w) = generator.generate(&mut StdRng::seed_from_u64(2018)).unwrap();
    let (second_data, second_w) = generator.generate(&mut StdRng::seed_from_u64(2018)).unwrap();

    assert_eq!(first_data, second_data);
    assert_eq!(first_w, second_w);
}

/// Geometry primitives refuse mismatched dimensions
#[test]
fn test_geometry_mismatch_sentinel() {
    let point = Point::new(vec![0.1, 0.2]);
    let weights = Hyperplane::new(vec![0.0, 1.0]);

    assert_eq!(classify(&point, &weights), None);
    assert_eq!(distance_to_hyperplane(&point, &weights), None);
}

/// The zero-update step from the observed rule: c=0.1, w=0, x=(1,1), label +1
#[test]
fn test_observed_rule_zero_step() {
    let point = Point::labeled(vec![1.0, 1.0], Label::Positive);
    let mut weights = Hyperplane::zeros(2);

    let y = classify(&point, &weights).unwrap();
    assert_eq!(y, Label::Negative);
    assert!(!apply_update(&mut weights, &point, y, 0.1, UpdateRule::Observed));
    assert_eq!(weights, Hyperplane::zeros(2));
}

/// Per-point updates through the trainer match a hand computation
#[test]
fn test_per_point_trace_matches_hand_computation() {
    let dataset = Dataset::new(
        2,
        vec![
            Point::labeled(vec![1.0, 1.0], Label::Positive),
            Point::labeled(vec![0.5, -1.0], Label::Negative),
        ],
    )
    .unwrap();
    let w_star = Hyperplane::new(vec![0.0, 1.0, 1.0]);
    let config = TrainerConfig {
        training_rate: 0.1,
        granularity: Granularity::Point,
        max_epochs: Some(1),
        ..TrainerConfig::default()
    };

    let mut recorder = RecordingObserver::new();
    PerceptronTrainer::new(config)
        .train_from(
            &dataset,
            &w_star,
            Hyperplane::new(vec![0.5, 0.0, 0.0]),
            Some(&mut recorder),
        )
        .unwrap();

    let snapshots = recorder.snapshots();
    assert_eq!(snapshots.len(), 2);

    // Point 1: decision 0.5 > 0, y = +1 = label, term 0.2
    //   w = (0.5 - 0.2, 0 - 0.2, 0 - 0.2) = (0.3, -0.2, -0.2)
    let first = snapshots[0].weights.as_slice();
    assert_relative_eq!(first[0], 0.3);
    assert_relative_eq!(first[1], -0.2);
    assert_relative_eq!(first[2], -0.2);
    assert_eq!(snapshots[0].focus, Some(vec![1.0, 1.0]));

    // Point 2: decision 0.3 - 0.1 + 0.2 = 0.4 > 0, y = +1, label -1, term 0
    assert_eq!(snapshots[1].weights.as_slice(), first);
}

/// Bounded training on a tiny-margin dataset returns instead of hanging
#[test]
fn test_epoch_cap_bounds_training() {
    let trained = Perceptron::new()
        .with_training_rate(0.001)
        .with_points(100)
        .with_gamma(0.0001)
        .with_dimensionality(3)
        .with_max_epochs(25)
        .run_seeded(3, None)
        .expect("run should succeed");

    assert!(trained.outcome().epochs <= 25);
    if !trained.converged() {
        assert_eq!(trained.outcome().epochs, 25);
    }
}

/// The corrected rule learns a hyperplane consistent with every label
#[test]
fn test_textbook_rule_separates_generated_data() {
    for seed in [10u64, 20, 30] {
        let trained = Perceptron::new()
            .with_training_rate(0.1)
            .with_points(30)
            .with_gamma(0.05)
            .with_update_rule(UpdateRule::Textbook)
            .with_max_epochs(200_000)
            .run_seeded(seed, None)
            .unwrap();

        assert!(trained.converged(), "seed {seed} did not converge");
        for point in trained.dataset() {
            assert_eq!(trained.predict(point), Some(point.label()));
        }
    }
}

/// The observed rule, when it settles, labels every point as the other class
#[test]
fn test_observed_rule_settles_on_inverted_labels() {
    for seed in [10u64, 20, 30] {
        let trained = Perceptron::new()
            .with_training_rate(0.1)
            .with_points(30)
            .with_gamma(0.05)
            .with_update_rule(UpdateRule::Observed)
            .with_max_epochs(200_000)
            .run_seeded(seed, None)
            .unwrap();

        assert!(trained.converged(), "seed {seed} did not converge");
        for point in trained.dataset() {
            assert_eq!(trained.predict(point), Some(point.label().opposite()));
        }
    }
}

/// A renderer that cannot draw the data does not disturb training
#[test]
fn test_rejecting_observer_is_tolerated() {
    let perceptron = Perceptron::new()
        .with_training_rate(0.1)
        .with_points(20)
        .with_gamma(0.05)
        .with_dimensionality(3)
        .with_update_rule(UpdateRule::Textbook)
        .with_max_epochs(100_000);

    let mut calls = 0usize;
    let mut planar_only = |frame: &Frame<'_>| {
        calls += 1;
        if frame.dataset.dim() == 2 {
            RenderStatus::Rendered
        } else {
            RenderStatus::DimensionMismatch
        }
    };

    let observed = perceptron.run_seeded(99, Some(&mut planar_only)).unwrap();
    let unobserved = perceptron.run_seeded(99, None).unwrap();

    assert!(calls > 0);
    assert_eq!(observed.outcome(), unobserved.outcome());
}

/// Zero points is a valid, empty generation
#[test]
fn test_empty_generation() {
    let mut rng = StdRng::seed_from_u64(0);
    let (dataset, w_star) = DatasetGenerator::new(GeneratorConfig::new(0, 0.3, 4))
        .generate(&mut rng)
        .unwrap();
    assert!(dataset.is_empty());
    assert_eq!(w_star.len(), 5);
}
