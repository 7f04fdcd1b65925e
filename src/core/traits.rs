//! Core traits for the perceptron implementation

use crate::core::{Dataset, Hyperplane, Point, RenderOptions};

/// Outcome reported by an observer after handling a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Frame was handled
    Rendered,
    /// The observer cannot display data of this dimensionality
    DimensionMismatch,
}

impl RenderStatus {
    /// Integer status code: 0 on success, -1 on dimensionality mismatch
    pub fn code(self) -> i32 {
        match self {
            RenderStatus::Rendered => 0,
            RenderStatus::DimensionMismatch => -1,
        }
    }

    pub fn is_ok(self) -> bool {
        self == RenderStatus::Rendered
    }
}

/// Snapshot of training state handed to an observer
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Dataset being trained on
    pub dataset: &'a Dataset,
    /// Hypothesis weights at this moment
    pub weights: &'a Hyperplane,
    /// Ground-truth weights the dataset was labeled with
    pub w_star: &'a Hyperplane,
    /// Point just processed, for per-point notifications
    pub focus: Option<&'a Point>,
    /// Zero-based index of the current epoch
    pub epoch: usize,
    /// Rendering parameters from the trainer configuration
    pub options: &'a RenderOptions,
    /// Number of highlight flashes, set only on the final converged frame
    pub flash_count: Option<usize>,
}

/// Observation hook invoked synchronously while training
///
/// The trainer never changes its control flow based on the returned status;
/// a failed render is logged and training continues.
pub trait TrainingObserver {
    /// Handle one frame. May block, e.g. to pause between frames.
    fn observe(&mut self, frame: &Frame<'_>) -> RenderStatus;
}

impl<F> TrainingObserver for F
where
    F: FnMut(&Frame<'_>) -> RenderStatus,
{
    fn observe(&mut self, frame: &Frame<'_>) -> RenderStatus {
        self(frame)
    }
}
