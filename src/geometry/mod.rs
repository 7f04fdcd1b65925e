//! Geometric primitives relating points to hyperplanes
//!
//! Every function here returns `None` when the point and the weight vector
//! disagree on dimensionality (`point.dim() + 1 != weights.len()`). That is a
//! precondition violation; callers must check before consuming the result.

use crate::core::{Hyperplane, Label, Point};

/// Dot product of two equally sized dense vectors
fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Raw decision value `dot(weights[1..], coordinates) + weights[0]`
pub fn decision_value(point: &Point, weights: &Hyperplane) -> Option<f64> {
    if point.dim() + 1 != weights.len() {
        return None;
    }
    Some(dot(weights.coefficients(), point.coordinates()) + weights.bias())
}

/// Distance of a point to the hyperplane described by `weights`
///
/// Computed as `|dot(x, w[1..]) + w[0]| / dim` where `dim = len(w) - 1`.
/// The normalisation is by dimensionality, not by the norm of the
/// coefficients, so this is the margin measure used during generation rather
/// than the Euclidean distance.
pub fn distance_to_hyperplane(point: &Point, weights: &Hyperplane) -> Option<f64> {
    decision_value(point, weights).map(|value| value.abs() / weights.dim() as f64)
}

/// Classify a point without touching its label
///
/// `Positive` if the decision value is strictly greater than zero, otherwise
/// `Negative`. A point exactly on the boundary is `Negative`.
pub fn classify(point: &Point, weights: &Hyperplane) -> Option<Label> {
    decision_value(point, weights).map(Label::from_decision)
}

/// Classify a point and return it carrying the resulting label
pub fn classify_and_label(point: Point, weights: &Hyperplane) -> Option<Point> {
    let label = classify(&point, weights)?;
    Some(point.with_label(label))
}

/// Cosine of the angle between the coefficient parts of two hyperplanes
///
/// Biases are ignored. Returns `None` when the dimensionalities differ or
/// either coefficient vector has zero norm.
pub fn cosine_similarity(a: &Hyperplane, b: &Hyperplane) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let norm_a = dot(a.coefficients(), a.coefficients()).sqrt();
    let norm_b = dot(b.coefficients(), b.coefficients()).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot(a.coefficients(), b.coefficients()) / (norm_a * norm_b))
}
