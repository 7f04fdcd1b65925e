//! Error types for the perceptron implementation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PerceptronError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid label at point {index}: expected -1 or +1, got {value}")]
    InvalidLabel { index: usize, value: i8 },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Generation gave up after {attempts} candidates with {accepted} points accepted")]
    GenerationExhausted { accepted: usize, attempts: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, PerceptronError>;
