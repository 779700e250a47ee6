//! Error types for breedid-classifier

use thiserror::Error;

/// Classifier error type
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Upload bytes are not a decodable JPEG/PNG image
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Model file missing or unparseable (fatal at startup)
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Model execution failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model produced a vector that does not line up with the label set
    #[error("Model output has {actual} scores, expected {expected}")]
    OutputShape { expected: usize, actual: usize },

    /// Threshold outside [0, 1]
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(f32),

    /// Label set empty or inconsistent
    #[error("Invalid labels: {0}")]
    InvalidLabels(String),
}

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;
