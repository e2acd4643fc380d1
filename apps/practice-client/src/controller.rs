//! Page-level practice controllers.

use std::collections::HashMap;

use lingo_core::{
    grade, ConversionOutcome, ExerciseKind, GradeResult, InkSurface, RecognitionEvent, Recognizer,
    SpeechBackend,
};
use serde::Serialize;

use crate::ocr::first_letter;

/// Running tally of graded answers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PracticeSession {
    pub correct: u32,
    pub total: u32,
    pub streak: u32,
    pub distribution: HashMap<ExerciseKind, u32>,
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grade an answer and record the verdict.
    pub fn submit(
        &mut self,
        kind: ExerciseKind,
        difficulty_tier: i32,
        answer: &str,
        target: &str,
        options: &[String],
    ) -> GradeResult {
        let result = grade(kind, difficulty_tier, answer, target, options);
        self.record(&result);
        result
    }

    pub fn record(&mut self, result: &GradeResult) {
        self.total += 1;
        if result.is_correct {
            self.correct += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        *self.distribution.entry(result.kind).or_default() += 1;
    }

    /// Share of correct answers, 0.0 before the first answer.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total)
    }
}

/// Letters recognized so far in a letter-writing drill.
#[derive(Debug, Clone, Default)]
pub struct LetterPad {
    letters: Vec<char>,
}

impl LetterPad {
    pub fn push(&mut self, letter: char) {
        self.letters.push(letter);
    }

    /// Remove the letter at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<char> {
        (index < self.letters.len()).then(|| self.letters.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn text(&self) -> String {
        self.letters.iter().collect()
    }
}

/// Outcome of checking a drawing against its target.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingCheck {
    Graded { recognized: String, result: GradeResult },
    /// The surface resolved without text; carries the reason.
    NotConverted(ConversionOutcome),
}

/// Handwriting drill: a surface, its OCR converter and the grader.
pub struct WritingDrill {
    surface: InkSurface,
    difficulty_tier: i32,
    pad: LetterPad,
    session: PracticeSession,
}

impl WritingDrill {
    /// `surface` should already carry its converter.
    pub fn new(surface: InkSurface, difficulty_tier: i32) -> Self {
        Self {
            surface,
            difficulty_tier,
            pad: LetterPad::default(),
            session: PracticeSession::new(),
        }
    }

    pub fn surface(&self) -> &InkSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut InkSurface {
        &mut self.surface
    }

    pub fn pad(&self) -> &LetterPad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut LetterPad {
        &mut self.pad
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    /// Convert the drawing and keep its first letter on the pad.
    pub async fn capture_letter(&mut self) -> Result<char, ConversionOutcome> {
        match self.surface.request_conversion().await {
            ConversionOutcome::Converted(text) => match first_letter(&text) {
                Some(letter) => {
                    self.pad.push(letter);
                    self.surface.clear();
                    Ok(letter)
                }
                None => Err(ConversionOutcome::Converted(text)),
            },
            other => Err(other),
        }
    }

    /// Convert the drawing and grade it as a spelling answer.
    ///
    /// When letters have been collected on the pad they are graded instead
    /// of the live drawing.
    pub async fn check(&mut self, target: &str) -> DrawingCheck {
        let recognized = if self.pad.is_empty() {
            match self.surface.request_conversion().await {
                ConversionOutcome::Converted(text) => text.trim().to_string(),
                other => return DrawingCheck::NotConverted(other),
            }
        } else {
            self.pad.text()
        };

        let result = self.session.submit(
            ExerciseKind::WrittenSpelling,
            self.difficulty_tier,
            &recognized,
            target,
            &[],
        );
        tracing::info!(%target, %recognized, correct = result.is_correct, "drawing checked");
        DrawingCheck::Graded { recognized, result }
    }
}

/// Speaking drill: an owned recognizer feeding the grader.
pub struct SpeakingDrill<B: SpeechBackend> {
    recognizer: Recognizer<B>,
    session: PracticeSession,
}

impl<B: SpeechBackend> SpeakingDrill<B> {
    pub fn new(recognizer: Recognizer<B>) -> Self {
        Self {
            recognizer,
            session: PracticeSession::new(),
        }
    }

    pub fn recognizer_mut(&mut self) -> &mut Recognizer<B> {
        &mut self.recognizer
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    /// Grade a recognizer event for a spoken exercise.
    ///
    /// Errors come back as the learner-facing message.
    pub fn grade_event(
        &mut self,
        event: RecognitionEvent,
        kind: ExerciseKind,
        difficulty_tier: i32,
        target: &str,
    ) -> Result<GradeResult, &'static str> {
        debug_assert!(kind.is_spoken());
        match event {
            RecognitionEvent::Result { transcript } => {
                Ok(self.session.submit(kind, difficulty_tier, &transcript, target, &[]))
            }
            RecognitionEvent::Error { kind: error } => Err(error.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::ink::{Dimensions, ElementRect, PointerEvent, PointerPhase, StaticHost};
    use lingo_core::{ConversionError, RecognizerConfig, SizeClass, SurfaceOptions};

    fn drawn_surface(recognized: &'static str) -> InkSurface {
        let options = SurfaceOptions {
            size_class: SizeClass::Small,
            ..SurfaceOptions::default()
        };
        let mut surface = InkSurface::new(options, StaticHost::default())
            .unwrap()
            .with_converter(move |_: String| async move {
                Ok::<_, ConversionError>(recognized.to_string())
            });
        let rect = ElementRect::at(0.0, 0.0, Dimensions::new(300, 200));
        surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Down, 20.0, 20.0), &rect);
        surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Move, 80.0, 90.0), &rect);
        surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Up, 80.0, 90.0), &rect);
        surface
    }

    #[test]
    fn session_tally() {
        let mut session = PracticeSession::new();
        assert_eq!(session.accuracy(), 0.0);
        session.submit(ExerciseKind::Generic, 1, "paris", "Paris", &[]);
        session.submit(ExerciseKind::Generic, 1, "rome", "Paris", &[]);
        session.submit(ExerciseKind::WrittenSpelling, 1, "cot", "cat", &[]);
        assert_eq!(session.total, 3);
        assert_eq!(session.correct, 2);
        assert_eq!(session.streak, 1);
        assert_eq!(session.distribution[&ExerciseKind::Generic], 2);
        assert!((session.accuracy() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn letter_pad_edits() {
        let mut pad = LetterPad::default();
        pad.push('c');
        pad.push('x');
        pad.push('a');
        assert_eq!(pad.remove(1), Some('x'));
        assert_eq!(pad.remove(9), None);
        pad.push('t');
        assert_eq!(pad.text(), "cat");
    }

    #[tokio::test]
    async fn check_grades_drawing() {
        let mut drill = WritingDrill::new(drawn_surface(" cot \n"), 1);
        match drill.check("cat").await {
            DrawingCheck::Graded { recognized, result } => {
                assert_eq!(recognized, "cot");
                assert!(result.is_correct);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(drill.session().total, 1);
    }

    #[tokio::test]
    async fn letters_collected_then_checked() {
        let mut drill = WritingDrill::new(drawn_surface("Cq"), 3);
        assert_eq!(drill.capture_letter().await, Ok('C'));
        assert!(!drill.surface().has_ink());
        drill.pad_mut().push('a');
        drill.pad_mut().push('t');

        match drill.check("cat").await {
            DrawingCheck::Graded { recognized, result } => {
                assert_eq!(recognized, "Cat");
                assert!(result.is_correct);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_surface_is_not_converted() {
        let surface = InkSurface::new(SurfaceOptions::default(), StaticHost::default()).unwrap();
        let mut drill = WritingDrill::new(surface, 1);
        assert_eq!(
            drill.check("cat").await,
            DrawingCheck::NotConverted(ConversionOutcome::NoInk)
        );
        assert_eq!(drill.session().total, 0);
    }

    struct SilentBackend;

    impl SpeechBackend for SilentBackend {
        fn start(&mut self, _config: &RecognizerConfig) -> Result<(), String> {
            Ok(())
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn speaking_drill_grades_transcript() {
        let mut drill = SpeakingDrill::new(Recognizer::new(SilentBackend, RecognizerConfig::default()));

        drill.recognizer_mut().start().unwrap();
        let event = drill.recognizer_mut().on_result(&["the cat sat on the mat"]).unwrap();
        let result = drill
            .grade_event(event, ExerciseKind::SpokenSentence, 1, "The cat sat on a mat.")
            .unwrap();
        assert!(result.is_correct);

        drill.recognizer_mut().start().unwrap();
        let event = drill.recognizer_mut().on_error("not-allowed").unwrap();
        let err = drill
            .grade_event(event, ExerciseKind::SpokenWord, 1, "cat")
            .unwrap_err();
        assert_eq!(err, "Microphone access denied. Please check your browser settings.");
        assert_eq!(drill.session().total, 1);
    }
}
