//! Error types for the hand interaction library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// The four calibration points are collinear or nearly so
    #[error("Degenerate calibration: {0}")]
    DegenerateCalibration(String),

    /// The hand-pose source stopped producing frames
    #[error("Frame acquisition failed: {0}")]
    FrameAcquisition(String),

    /// A persisted calibration or lock file could not be decoded
    #[error("Malformed persisted artifact {path}: {reason}")]
    MalformedArtifact {
        /// File the artifact was read from
        path: String,
        /// Decoder message
        reason: String,
    },

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image buffer operation failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filter initialization or processing error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
