//! Core type definitions for the perceptron

use crate::core::{PerceptronError, Result};
use std::fmt;
use std::time::Duration;

/// Classification of a point relative to a hyperplane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Label {
    /// Not yet assigned (numeric value 0)
    #[default]
    Unclassified,
    /// Negative side of the hyperplane (-1)
    Negative,
    /// Positive side of the hyperplane (+1)
    Positive,
}

impl Label {
    /// Label for a raw decision value; exactly zero falls on the negative side
    pub fn from_decision(value: f64) -> Self {
        if value > 0.0 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    /// Numeric value of the label: -1, 0 or +1
    pub fn value(self) -> i8 {
        match self {
            Label::Unclassified => 0,
            Label::Negative => -1,
            Label::Positive => 1,
        }
    }

    /// Numeric value as a float, for use in weight updates
    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    /// Whether the label is one of -1 / +1
    pub fn is_classified(self) -> bool {
        self != Label::Unclassified
    }

    /// The other class. `Unclassified` stays unclassified.
    pub fn opposite(self) -> Self {
        match self {
            Label::Unclassified => Label::Unclassified,
            Label::Negative => Label::Positive,
            Label::Positive => Label::Negative,
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = PerceptronError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Label::Unclassified),
            -1 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(PerceptronError::InvalidParameter(format!(
                "label must be -1, 0 or 1, got {other}"
            ))),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A point in i-dimensional space with its classification
///
/// Points are values: relabeling produces a new point via [`Point::with_label`].
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    coordinates: Vec<f64>,
    label: Label,
}

impl Point {
    /// Create an unclassified point
    pub fn new(coordinates: Vec<f64>) -> Self {
        Self {
            coordinates,
            label: Label::Unclassified,
        }
    }

    /// Create a point with a known label
    pub fn labeled(coordinates: Vec<f64>, label: Label) -> Self {
        Self { coordinates, label }
    }

    /// Consume the point and return a copy carrying `label`
    pub fn with_label(self, label: Label) -> Self {
        Self {
            coordinates: self.coordinates,
            label,
        }
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn label(&self) -> Label {
        self.label
    }

    /// Dimensionality of the point
    pub fn dim(&self) -> usize {
        self.coordinates.len()
    }
}

/// Bias-plus-coefficients weight vector defining a linear decision boundary
///
/// Index 0 is the bias term, indices `1..=dim` are the coefficients for each
/// coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperplane {
    weights: Vec<f64>,
}

impl Hyperplane {
    /// Create a hyperplane from raw weights
    ///
    /// # Panics
    /// Panics if `weights` is empty (there must at least be a bias term)
    pub fn new(weights: Vec<f64>) -> Self {
        assert!(
            !weights.is_empty(),
            "Hyperplane requires at least a bias term"
        );
        Self { weights }
    }

    /// All-zero hyperplane of the given dimensionality
    pub fn zeros(dimensionality: usize) -> Self {
        Self::new(vec![0.0; dimensionality + 1])
    }

    pub fn bias(&self) -> f64 {
        self.weights[0]
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.weights[1..]
    }

    /// Dimensionality of the space the hyperplane lives in (`len - 1`)
    pub fn dim(&self) -> usize {
        self.weights.len() - 1
    }

    /// Number of weights including the bias
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false: a hyperplane carries at least its bias
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.weights
    }
}

impl fmt::Display for Hyperplane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{w:.6}")?;
        }
        write!(f, "]")
    }
}

/// Ordered, fixed-size collection of points sharing one dimensionality
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    points: Vec<Point>,
    dimensionality: usize,
}

impl Dataset {
    /// Create a dataset, checking every point has `dimensionality` coordinates
    pub fn new(dimensionality: usize, points: Vec<Point>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| p.dim() != dimensionality) {
            return Err(PerceptronError::DimensionMismatch {
                expected: dimensionality,
                actual: bad.dim(),
            });
        }
        Ok(Self {
            points,
            dimensionality,
        })
    }

    /// Create a dataset whose dimensionality is taken from the first point
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        let dimensionality = points
            .first()
            .map(Point::dim)
            .ok_or(PerceptronError::EmptyDataset)?;
        Self::new(dimensionality, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of coordinates per point
    pub fn dim(&self) -> usize {
        self.dimensionality
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// All labels in dataset order
    pub fn labels(&self) -> Vec<Label> {
        self.points.iter().map(Point::label).collect()
    }

    /// Count of (negative, positive) labeled points
    pub fn class_counts(&self) -> (usize, usize) {
        self.points
            .iter()
            .fold((0, 0), |(neg, pos), p| match p.label() {
                Label::Negative => (neg + 1, pos),
                Label::Positive => (neg, pos + 1),
                Label::Unclassified => (neg, pos),
            })
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// How the bias of the ground-truth hyperplane is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiasPolicy {
    /// Drawn uniformly from `[-scale, scale]` like every other coefficient
    #[default]
    Random,
    /// Fixed at zero, so the boundary passes through the origin
    ThroughOrigin,
}

/// Weight correction applied for each visited point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateRule {
    /// `w -= c * (label + y) * x`: moves on correctly classified points and
    /// stands still on misclassified ones
    #[default]
    Observed,
    /// `w += c * (label - y) * x`: the classical rule, zero when correct
    Textbook,
}

/// When the trainer notifies its observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Once after every full pass over the dataset
    #[default]
    Epoch,
    /// After every single point update, with that point in focus
    Point,
}

/// Rendering parameters passed through to the observer untouched
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Axis extent for renderers
    pub scale: f64,
    /// Whether the renderer should block on its own display
    pub show: bool,
    /// Whether the renderer redraws in place
    pub dynamic: bool,
    /// How long the renderer pauses after each frame
    pub pause: Duration,
    /// Number of highlight flashes emitted on convergence (0 disables)
    pub flash_count: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            show: false,
            dynamic: true,
            pause: Duration::from_millis(10),
            flash_count: 0,
        }
    }
}

/// Configuration for dataset generation
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Number of points to generate
    pub n: usize,
    /// Minimum margin every point must keep from the ground-truth boundary
    pub gamma: f64,
    /// Number of coordinates per point
    pub dimensionality: usize,
    /// Coordinates and weights are drawn from `[-scale, scale]`
    pub scale: f64,
    /// Bias policy for the ground-truth hyperplane
    pub bias_policy: BiasPolicy,
    /// Cap on rejection-sampling candidates; `None` samples until done
    pub max_attempts: Option<usize>,
}

impl GeneratorConfig {
    /// Configuration with the given size, margin and dimensionality
    pub fn new(n: usize, gamma: f64, dimensionality: usize) -> Self {
        Self {
            n,
            gamma,
            dimensionality,
            ..Self::default()
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n: 30,
            gamma: 0.01,
            dimensionality: 2,
            scale: 1.0,
            bias_policy: BiasPolicy::Random,
            max_attempts: None,
        }
    }
}

/// Configuration for the perceptron trainer
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Step size `c` of each weight correction
    pub training_rate: f64,
    /// Which correction formula to apply
    pub update_rule: UpdateRule,
    /// When to notify the observer
    pub granularity: Granularity,
    /// Stop after this many epochs even without convergence
    pub max_epochs: Option<usize>,
    /// Parameters forwarded to the observer
    pub render: RenderOptions,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            training_rate: 0.001,
            update_rule: UpdateRule::Observed,
            granularity: Granularity::Epoch,
            max_epochs: None,
            render: RenderOptions::default(),
        }
    }
}
