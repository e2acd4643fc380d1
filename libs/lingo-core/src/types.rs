//! Core types shared by the grader, the ink surface and the recognizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GradeError, SurfaceError};

/// Exercise kind, which selects the matching policy.
///
/// Wire names follow the lesson service: `speaking_word`,
/// `speaking_sentence`, `listening`, `writing`. Anything else is `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExerciseKind {
    SpokenWord,
    SpokenSentence,
    ListeningChoice,
    WrittenSpelling,
    Generic,
}

impl ExerciseKind {
    /// Get the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpokenWord => "speaking_word",
            Self::SpokenSentence => "speaking_sentence",
            Self::ListeningChoice => "listening",
            Self::WrittenSpelling => "writing",
            Self::Generic => "generic",
        }
    }

    /// Whether the kind uses the lenient speech policy.
    pub fn is_spoken(self) -> bool {
        matches!(self, Self::SpokenWord | Self::SpokenSentence)
    }
}

impl Default for ExerciseKind {
    fn default() -> Self {
        Self::Generic
    }
}

impl FromStr for ExerciseKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "speaking_word" => Self::SpokenWord,
            "speaking_sentence" => Self::SpokenSentence,
            "listening" => Self::ListeningChoice,
            "writing" => Self::WrittenSpelling,
            _ => Self::Generic,
        })
    }
}

impl From<String> for ExerciseKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<ExerciseKind> for String {
    fn from(kind: ExerciseKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grading request as page controllers send it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRequest {
    #[serde(rename = "exercise_type")]
    pub kind: ExerciseKind,
    #[serde(rename = "difficulty", default)]
    pub difficulty_tier: i32,
    #[serde(rename = "user_answer")]
    pub candidate_text: String,
    #[serde(rename = "correct_answer")]
    pub target_text: String,
    /// Listening-choice options; ignored by other kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl GradeRequest {
    pub fn new(
        kind: ExerciseKind,
        difficulty_tier: i32,
        candidate_text: impl Into<String>,
        target_text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            difficulty_tier,
            candidate_text: candidate_text.into(),
            target_text: target_text.into(),
            options: Vec::new(),
        }
    }

    /// Attach listening-choice options.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Decode a request from JSON.
    ///
    /// Non-string answer fields are a contract violation and fail with
    /// `GradeError::InvalidInput`; nothing is coerced.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json).map_err(|e| GradeError::InvalidInput(e.to_string()))
    }
}

/// Named canvas dimension presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    /// Width follows the live container measurement.
    FillContainer,
    /// Explicit logical size, used when a host passes its own dimensions.
    Custom { width: u32, height: u32 },
}

impl Default for SizeClass {
    fn default() -> Self {
        Self::Medium
    }
}

impl SizeClass {
    /// Horizontal padding subtracted from the container width.
    pub const CONTAINER_PADDING: f64 = 20.0;

    /// Fixed logical height of the container-filling mode.
    pub const FILL_HEIGHT: u32 = 350;

    /// Largest logical edge a surface may have.
    pub const MAX_LOGICAL_SIZE: u32 = 2048;

    /// Reject explicit sizes with an empty or oversized edge.
    pub fn validate(self) -> Result<(), SurfaceError> {
        match self.preset() {
            Some((width, height))
                if !(1..=Self::MAX_LOGICAL_SIZE).contains(&width)
                    || !(1..=Self::MAX_LOGICAL_SIZE).contains(&height) =>
            {
                Err(SurfaceError::InvalidDimensions { width, height })
            }
            _ => Ok(()),
        }
    }

    /// Fixed logical size for the class, `None` for `FillContainer`.
    pub fn preset(self) -> Option<(u32, u32)> {
        match self {
            Self::Small => Some((300, 200)),
            Self::Medium => Some((400, 300)),
            Self::Large => Some((600, 350)),
            Self::FillContainer => None,
            Self::Custom { width, height } => Some((width, height)),
        }
    }
}

impl FromStr for SizeClass {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "fill_container" | "full-width" => Ok(Self::FillContainer),
            other => Err(SurfaceError::UnknownSizeClass(other.to_string())),
        }
    }
}

/// The externally tunable knobs of an ink surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    pub size_class: SizeClass,
    pub stroke_width: u8,
    pub allow_resize: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            size_class: SizeClass::Medium,
            stroke_width: 3,
            allow_resize: true,
        }
    }
}

/// Speech recognizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub lang: String,
    pub max_alternatives: u8,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            max_alternatives: 3,
            continuous: false,
            interim_results: false,
        }
    }
}
