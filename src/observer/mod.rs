//! Stock [`TrainingObserver`] implementations
//!
//! Rendering is left to callers; these observers cover logging the progress
//! of a run and recording weight snapshots.

use crate::core::{Frame, Hyperplane, RenderStatus, TrainingObserver};
use crate::geometry::{classify, cosine_similarity};
use log::info;
use std::thread;

/// Observer that ignores every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TrainingObserver for NullObserver {
    fn observe(&mut self, _frame: &Frame<'_>) -> RenderStatus {
        RenderStatus::Rendered
    }
}

/// Logs a one-line summary per frame and honours the configured pause
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    frames: usize,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames seen so far
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl TrainingObserver for LoggingObserver {
    fn observe(&mut self, frame: &Frame<'_>) -> RenderStatus {
        self.frames += 1;

        let agreeing = frame
            .dataset
            .iter()
            .filter(|p| classify(p, frame.weights) == Some(p.label()))
            .count();
        let alignment = cosine_similarity(frame.weights, frame.w_star)
            .map(|cos| format!("{cos:.4}"))
            .unwrap_or_else(|| "n/a".to_string());

        match (frame.flash_count, frame.focus) {
            (Some(flashes), _) => info!(
                "epoch {}: converged, w={} (flash x{})",
                frame.epoch, frame.weights, flashes
            ),
            (None, Some(point)) => info!(
                "epoch {}: point {:?} (label {}), w={}, agreement {}/{}, cos(w, w*)={}",
                frame.epoch,
                point.coordinates(),
                point.label(),
                frame.weights,
                agreeing,
                frame.dataset.len(),
                alignment
            ),
            (None, None) => info!(
                "epoch {}: w={}, agreement {}/{}, cos(w, w*)={}",
                frame.epoch,
                frame.weights,
                agreeing,
                frame.dataset.len(),
                alignment
            ),
        }

        if frame.options.dynamic && !frame.options.pause.is_zero() {
            thread::sleep(frame.options.pause);
        }

        RenderStatus::Rendered
    }
}

/// Records a snapshot of the weights for every frame
///
/// Frames from a dataset whose dimensionality differs from `dimensionality`
/// (when set) are rejected with [`RenderStatus::DimensionMismatch`], the way
/// a fixed-dimension renderer would.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    dimensionality: Option<usize>,
    snapshots: Vec<Snapshot>,
}

/// Weights captured from a single frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub epoch: usize,
    pub weights: Hyperplane,
    pub focus: Option<Vec<f64>>,
    pub flash_count: Option<usize>,
}

impl RecordingObserver {
    /// Record frames of any dimensionality
    pub fn new() -> Self {
        Self::default()
    }

    /// Record only frames of the given dimensionality
    pub fn for_dimensionality(dimensionality: usize) -> Self {
        Self {
            dimensionality: Some(dimensionality),
            snapshots: Vec::new(),
        }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl TrainingObserver for RecordingObserver {
    fn observe(&mut self, frame: &Frame<'_>) -> RenderStatus {
        if self
            .dimensionality
            .is_some_and(|dim| dim != frame.dataset.dim())
        {
            return RenderStatus::DimensionMismatch;
        }

        self.snapshots.push(Snapshot {
            epoch: frame.epoch,
            weights: frame.weights.clone(),
            focus: frame.focus.map(|p| p.coordinates().to_vec()),
            flash_count: frame.flash_count,
        });
        RenderStatus::Rendered
    }
}
