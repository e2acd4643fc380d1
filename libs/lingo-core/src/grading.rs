//! Answer grading for spoken, listening and written exercises.

use crate::error::Result;
use crate::types::{ExerciseKind, GradeRequest};
use serde::{Deserialize, Serialize};

/// Characters removed by [`normalize`].
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Word-overlap ratio a spoken sentence must exceed.
pub const SENTENCE_OVERLAP_THRESHOLD: f64 = 0.6;

/// Difficulty tiers at or below this allow one typo in spelling drills.
pub const LENIENT_SPELLING_MAX_TIER: i32 = 2;

/// Outcome of grading one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Whether the answer is accepted.
    pub is_correct: bool,
    /// Levenshtein distance between the normalized strings.
    pub distance: usize,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// Word-overlap ratio, only computed for spoken sentences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_overlap: Option<f64>,
    /// The policy that produced the verdict.
    pub kind: ExerciseKind,
    pub normalized_candidate: String,
    pub normalized_target: String,
}

impl GradeResult {
    /// Learner-facing feedback line for this verdict.
    pub fn feedback(&self, target: &str) -> String {
        match (self.kind, self.is_correct) {
            (ExerciseKind::SpokenWord | ExerciseKind::SpokenSentence, true) => {
                "✓ Correct! Good pronunciation!".to_string()
            }
            (ExerciseKind::SpokenWord | ExerciseKind::SpokenSentence, false) => {
                format!("✗ Try saying: \"{target}\"")
            }
            (ExerciseKind::ListeningChoice, true) => "✓ Correct! Well done!".to_string(),
            (ExerciseKind::ListeningChoice, false) => {
                format!("✗ The correct answer is: \"{target}\"")
            }
            (ExerciseKind::WrittenSpelling, true) => {
                "✓ Perfect! Your spelling is correct!".to_string()
            }
            (ExerciseKind::WrittenSpelling, false) => format!("✗ Correct spelling: \"{target}\""),
            (ExerciseKind::Generic, true) => "✓ Correct answer!".to_string(),
            (ExerciseKind::Generic, false) => format!("✗ Incorrect. Answer: \"{target}\""),
        }
    }
}

/// Grade a candidate answer against a target under the policy for `kind`.
///
/// `options` is only consulted for listening-choice exercises. Inputs are
/// never mutated.
pub fn grade<S: AsRef<str>>(
    kind: ExerciseKind,
    difficulty_tier: i32,
    candidate: &str,
    target: &str,
    options: &[S],
) -> GradeResult {
    let normalized_candidate = normalize(candidate);
    let normalized_target = normalize(target);
    let distance = levenshtein_distance(&normalized_candidate, &normalized_target);
    let similarity = similarity_from_distance(&normalized_candidate, &normalized_target, distance);
    let exact = normalized_candidate == normalized_target;

    let mut word_overlap = None;
    let is_correct = match kind {
        ExerciseKind::SpokenWord | ExerciseKind::SpokenSentence => {
            if kind == ExerciseKind::SpokenSentence {
                word_overlap = Some(word_overlap_ratio(&normalized_candidate, &normalized_target));
            }
            exact
                || spoken_containment(&normalized_candidate, &normalized_target)
                || word_overlap.is_some_and(|ratio| ratio > SENTENCE_OVERLAP_THRESHOLD)
                || distance <= spoken_typo_allowance(&normalized_target)
        }
        ExerciseKind::ListeningChoice => {
            let answer = fold_choice(candidate);
            answer == fold_choice(target)
                || options.iter().any(|opt| fold_choice(opt.as_ref()) == answer)
        }
        ExerciseKind::WrittenSpelling if difficulty_tier <= LENIENT_SPELLING_MAX_TIER => {
            exact || distance <= 1
        }
        ExerciseKind::WrittenSpelling | ExerciseKind::Generic => exact,
    };

    tracing::debug!(
        kind = %kind,
        difficulty_tier,
        distance,
        is_correct,
        "graded answer"
    );

    GradeResult {
        is_correct,
        distance,
        similarity,
        word_overlap,
        kind,
        normalized_candidate,
        normalized_target,
    }
}

/// Grade a decoded request.
pub fn grade_request(request: &GradeRequest) -> GradeResult {
    grade(
        request.kind,
        request.difficulty_tier,
        &request.candidate_text,
        &request.target_text,
        request.options.as_slice(),
    )
}

/// Decode a JSON request and grade it.
pub fn grade_json(json: &str) -> Result<GradeResult> {
    let request = GradeRequest::from_json(json)?;
    Ok(grade_request(&request))
}

/// Normalize text before comparison.
///
/// Lowercases, strips the fixed punctuation set, collapses runs of two or
/// more whitespace characters into one space and trims. Idempotent.
pub fn normalize(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();

    let mut out = String::with_capacity(stripped.len());
    let mut chars = stripped.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out.trim().to_string()
}

/// Case- and edge-whitespace-insensitive form used for listening choices.
fn fold_choice(s: &str) -> String {
    s.trim().to_lowercase()
}

fn spoken_containment(candidate: &str, target: &str) -> bool {
    if candidate.contains(target) {
        return true;
    }
    let candidate_len = candidate.chars().count() as f64;
    let target_len = target.chars().count() as f64;
    target.contains(candidate) && candidate_len > target_len / 2.0
}

/// Edits tolerated for spoken answers: a quarter of the target, at least 2.
fn spoken_typo_allowance(target: &str) -> usize {
    let quarter = (target.chars().count() as f64 * 0.25).floor() as usize;
    quarter.max(2)
}

/// Share of candidate words that appear in the target.
///
/// Each candidate word is a membership check against the target words, so a
/// repeated candidate word may match the same target word more than once.
pub fn word_overlap_ratio(candidate: &str, target: &str) -> f64 {
    let candidate_words: Vec<&str> = candidate.split(' ').collect();
    let target_words: Vec<&str> = target.split(' ').collect();

    let matches = candidate_words
        .iter()
        .filter(|word| target_words.contains(*word))
        .count();

    matches as f64 / candidate_words.len().max(target_words.len()) as f64
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows of the (m + 1) x (n + 1) table
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Calculate normalized similarity (0.0 to 1.0) based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    similarity_from_distance(a, b, levenshtein_distance(a, b))
}

fn similarity_from_distance(a: &str, b: &str, distance: usize) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (distance as f64 / max_len as f64)
}

/// Segment kind in a word-level diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiffType {
    /// Word is the same in both answers.
    Same,
    /// Word is in the target but missing from the answer.
    Added,
    /// Word is in the answer but not the target.
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSegment {
    pub text: String,
    pub diff_type: DiffType,
}

impl DiffSegment {
    fn new(text: &str, diff_type: DiffType) -> Self {
        Self {
            text: text.to_string(),
            diff_type,
        }
    }
}

/// How far ahead the diff looks for a resynchronizing word.
const DIFF_LOOKAHEAD: usize = 3;

/// Word-level diff between an answer and its target, for feedback display.
///
/// Words compare after [`normalize`]; segments keep the original spelling.
pub fn word_diff(answer: &str, target: &str) -> Vec<DiffSegment> {
    let answer_words: Vec<&str> = answer.split_whitespace().collect();
    let target_words: Vec<&str> = target.split_whitespace().collect();
    let same = |a: &str, b: &str| normalize(a) == normalize(b);

    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < answer_words.len() && j < target_words.len() {
        if same(answer_words[i], target_words[j]) {
            result.push(DiffSegment::new(answer_words[i], DiffType::Same));
            i += 1;
            j += 1;
            continue;
        }

        let target_skip = (j + 1..target_words.len().min(j + DIFF_LOOKAHEAD))
            .find(|&k| same(answer_words[i], target_words[k]));
        if let Some(k) = target_skip {
            result.extend(
                target_words[j..k]
                    .iter()
                    .map(|w| DiffSegment::new(w, DiffType::Added)),
            );
            j = k;
            continue;
        }

        let answer_skip = (i + 1..answer_words.len().min(i + DIFF_LOOKAHEAD))
            .find(|&k| same(target_words[j], answer_words[k]));
        if let Some(k) = answer_skip {
            result.extend(
                answer_words[i..k]
                    .iter()
                    .map(|w| DiffSegment::new(w, DiffType::Removed)),
            );
            i = k;
            continue;
        }

        result.push(DiffSegment::new(answer_words[i], DiffType::Removed));
        result.push(DiffSegment::new(target_words[j], DiffType::Added));
        i += 1;
        j += 1;
    }

    result.extend(
        answer_words[i..]
            .iter()
            .map(|w| DiffSegment::new(w, DiffType::Removed)),
    );
    result.extend(
        target_words[j..]
            .iter()
            .map(|w| DiffSegment::new(w, DiffType::Added)),
    );
    result
}
