//! Speech recognizer resource.
//!
//! One recognizer is built per practice page and reused for every attempt.
//! It moves `Idle -> Recording -> Idle`, leaving `Recording` on exactly one
//! of result, error or stop. Events that arrive while idle are dropped, so a
//! late callback from an earlier attempt cannot leak into the next one.

use serde::{Deserialize, Serialize};

use crate::error::RecognizerError;
use crate::types::RecognizerConfig;

/// Platform speech engine the recognizer drives.
pub trait SpeechBackend: Send {
    /// Begin listening. Errors are reported as backend messages.
    fn start(&mut self, config: &RecognizerConfig) -> Result<(), String>;

    /// Stop listening; pending results may be discarded.
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerState {
    Idle,
    Recording,
}

/// Error codes reported by speech engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionErrorKind {
    NotAllowed,
    NoSpeech,
    Network,
    Other(String),
}

impl RecognitionErrorKind {
    /// Map an engine error code such as `not-allowed`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" => Self::NotAllowed,
            "no-speech" => Self::NoSpeech,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }

    /// Learner-facing explanation.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotAllowed => "Microphone access denied. Please check your browser settings.",
            Self::NoSpeech => "No speech detected. Please try again and speak clearly.",
            Self::Network => "Network error occurred. Please check your connection.",
            Self::Other(_) => "Speech recognition failed.",
        }
    }
}

/// What a finished recording produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Result { transcript: String },
    Error { kind: RecognitionErrorKind },
}

#[derive(Debug)]
pub struct Recognizer<B: SpeechBackend> {
    backend: Option<B>,
    config: RecognizerConfig,
    state: RecognizerState,
}

impl<B: SpeechBackend> Recognizer<B> {
    pub fn new(backend: B, config: RecognizerConfig) -> Self {
        Self {
            backend: Some(backend),
            config,
            state: RecognizerState::Idle,
        }
    }

    /// Recognizer for a device without a speech engine; `start` always fails.
    pub fn unsupported(config: RecognizerConfig) -> Self {
        Self {
            backend: None,
            config,
            state: RecognizerState::Idle,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_some()
    }

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn start(&mut self) -> Result<(), RecognizerError> {
        let backend = self.backend.as_mut().ok_or(RecognizerError::Unsupported)?;
        if self.state == RecognizerState::Recording {
            return Err(RecognizerError::AlreadyRecording);
        }
        backend.start(&self.config).map_err(RecognizerError::Backend)?;
        tracing::debug!(lang = %self.config.lang, "recording started");
        self.state = RecognizerState::Recording;
        Ok(())
    }

    /// Deliver recognition alternatives; the first one is the transcript.
    pub fn on_result<S: AsRef<str>>(&mut self, alternatives: &[S]) -> Option<RecognitionEvent> {
        if self.state != RecognizerState::Recording {
            tracing::debug!("result ignored while idle");
            return None;
        }
        self.state = RecognizerState::Idle;
        let transcript = alternatives
            .first()
            .map(|alt| alt.as_ref().to_string())
            .unwrap_or_default();
        tracing::info!(%transcript, "recognition result");
        Some(RecognitionEvent::Result { transcript })
    }

    /// Deliver an engine error code.
    pub fn on_error(&mut self, code: &str) -> Option<RecognitionEvent> {
        if self.state != RecognizerState::Recording {
            return None;
        }
        self.state = RecognizerState::Idle;
        let kind = RecognitionErrorKind::from_code(code);
        tracing::warn!(code, "speech recognition error");
        Some(RecognitionEvent::Error { kind })
    }

    /// Stop an active recording.
    pub fn stop(&mut self) {
        if self.state != RecognizerState::Recording {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.stop();
        }
        self.state = RecognizerState::Idle;
    }
}

impl<B: SpeechBackend> Drop for Recognizer<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
