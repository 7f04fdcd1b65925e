//! Rust implementation of the linear perceptron
//!
//! Generates linearly separable datasets with a guaranteed margin around a
//! random ground-truth hyperplane and learns a separating hyperplane with the
//! perceptron update rule.

pub mod api;
pub mod core;
pub mod generator;
pub mod geometry;
pub mod observer;
pub mod report;
pub mod trainer;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, Perceptron, Preset, TrainedPerceptron};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{PerceptronError, Result};
pub use crate::generator::DatasetGenerator;
pub use crate::geometry::{classify, classify_and_label, distance_to_hyperplane};
pub use crate::observer::{LoggingObserver, NullObserver, RecordingObserver};
pub use crate::report::RunReport;
pub use crate::trainer::{PerceptronTrainer, TrainingOutcome};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
