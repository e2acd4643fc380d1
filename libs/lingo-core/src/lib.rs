//! Core library for the language-learning practice client.
//!
//! Provides:
//! - Answer grading (normalization, Levenshtein distance, word overlap)
//! - An ink capture surface that turns pointer input into PNG payloads
//! - A speech recognizer state machine around a platform backend
//! - Shared types (ExerciseKind, GradeRequest, SurfaceOptions, etc.)

pub mod error;
pub mod grading;
pub mod ink;
pub mod recognizer;
pub mod types;

pub use error::{ConversionError, GradeError, RecognizerError, Result, SurfaceError};
pub use grading::{
    grade, grade_json, grade_request, levenshtein_distance, normalize, normalized_similarity,
    word_diff, word_overlap_ratio, DiffSegment, DiffType, GradeResult,
};
pub use ink::{ConversionOutcome, InkSurface, TextConverter};
pub use recognizer::{RecognitionErrorKind, RecognitionEvent, Recognizer, RecognizerState, SpeechBackend};
pub use types::{ExerciseKind, GradeRequest, RecognizerConfig, SizeClass, SurfaceOptions};
