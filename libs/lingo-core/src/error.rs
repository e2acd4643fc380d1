//! Error types for lingo-core.

use thiserror::Error;

/// Result type alias using GradeError.
pub type Result<T> = std::result::Result<T, GradeError>;

/// Errors raised at the grading call boundary.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("invalid grading input: {0}")]
    InvalidInput(String),
}

/// Input contract violations on the ink surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("stroke width {0} is outside 1..=10")]
    InvalidStrokeWidth(u8),

    #[error("surface size {width}x{height} is outside 1..={max}", max = crate::types::SizeClass::MAX_LOGICAL_SIZE)]
    InvalidDimensions { width: u32, height: u32 },

    #[error("unknown size class: {0}")]
    UnknownSizeClass(String),

    #[error("resize controls are disabled for this surface")]
    ResizeDisabled,
}

/// Failure reported by an injected text converter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("conversion failed: {0}")]
pub struct ConversionError(pub String);

/// Illegal transitions of the speech recognizer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecognizerError {
    #[error("speech recognition is not supported on this device")]
    Unsupported,

    #[error("recognizer is already recording")]
    AlreadyRecording,

    #[error("recognizer backend failed to start: {0}")]
    Backend(String),
}
