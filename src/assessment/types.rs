//! Assessment data types
//!
//! Task identifiers, trials, task scores and the battery summary.

use crate::types::DifficultyTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight skill tasks, in the order the battery runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskId {
    WordRecognition,
    LetterAccuracy,
    PhonemeMatching,
    WordSequencing,
    ReadingComprehension,
    WorkingMemory,
    VisualProcessing,
    Spelling,
}

impl TaskId {
    pub const ALL: [TaskId; 8] = [
        TaskId::WordRecognition,
        TaskId::LetterAccuracy,
        TaskId::PhonemeMatching,
        TaskId::WordSequencing,
        TaskId::ReadingComprehension,
        TaskId::WorkingMemory,
        TaskId::VisualProcessing,
        TaskId::Spelling,
    ];

    /// Zero-based position in the battery
    pub fn index(&self) -> usize {
        match self {
            TaskId::WordRecognition => 0,
            TaskId::LetterAccuracy => 1,
            TaskId::PhonemeMatching => 2,
            TaskId::WordSequencing => 3,
            TaskId::ReadingComprehension => 4,
            TaskId::WorkingMemory => 5,
            TaskId::VisualProcessing => 6,
            TaskId::Spelling => 7,
        }
    }

    /// One-based task number as shown to the child
    pub fn number(&self) -> usize {
        self.index() + 1
    }

    pub fn from_number(number: usize) -> Option<TaskId> {
        number
            .checked_sub(1)
            .and_then(|i| TaskId::ALL.get(i).copied())
    }

    pub fn next(&self) -> Option<TaskId> {
        TaskId::ALL.get(self.index() + 1).copied()
    }

    /// Fixed number of trials, or `None` for the open-ended span task
    pub fn trial_count(&self) -> Option<usize> {
        match self {
            TaskId::WordRecognition => Some(20),
            TaskId::LetterAccuracy => Some(30),
            TaskId::PhonemeMatching => Some(20),
            TaskId::WordSequencing => Some(15),
            TaskId::ReadingComprehension => Some(5),
            TaskId::WorkingMemory => None,
            TaskId::VisualProcessing => Some(25),
            TaskId::Spelling => Some(20),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TaskId::WordRecognition => "Word Recognition Speed",
            TaskId::LetterAccuracy => "Letter Accuracy",
            TaskId::PhonemeMatching => "Phoneme Matching",
            TaskId::WordSequencing => "Word Sequencing",
            TaskId::ReadingComprehension => "Reading Comprehension",
            TaskId::WorkingMemory => "Working Memory Span",
            TaskId::VisualProcessing => "Visual Processing Speed",
            TaskId::Spelling => "Spelling Recognition",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            TaskId::WordRecognition => {
                "Identify and tap the correct word among the options. Speed counts! (20 trials)"
            }
            TaskId::LetterAccuracy => {
                "Identify the target letter correctly. Watch out for b/d and p/q! (30 trials)"
            }
            TaskId::PhonemeMatching => {
                "Listen to the phoneme sound and tap the matching letter. (20 trials)"
            }
            TaskId::WordSequencing => {
                "Unscramble the letters to form the correct word. Both accuracy and speed matter. (15 trials)"
            }
            TaskId::ReadingComprehension => {
                "Read the short passage about the brown dog and answer 5 questions."
            }
            TaskId::WorkingMemory => {
                "Memorize the sequence of numbers shown for 2 seconds. The sequence will get longer."
            }
            TaskId::VisualProcessing => {
                "Match the target symbol at the top with the options below. Move fast! (25 trials)"
            }
            TaskId::Spelling => "Choose the correctly spelled word from the pair. (20 trials)",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {}: {}", self.number(), self.title())
    }
}

/// One stimulus/response pair.
///
/// Correctness is derived by exact comparison of `response` against
/// `expected`. Latency comes either from `elapsed_ms` or, when absent, from
/// the difference between `presented_at` and `responded_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentTrial {
    pub expected: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presented_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl AssessmentTrial {
    pub fn answered(expected: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            response: response.into(),
            options: Vec::new(),
            elapsed_ms: None,
            presented_at: None,
            responded_at: None,
        }
    }

    /// A trial answered correctly or not, with the expected value `"correct"`
    pub fn outcome(correct: bool) -> Self {
        Self::answered("correct", if correct { "correct" } else { "incorrect" })
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: f64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Stamp presentation and response instants; latency follows from them
    pub fn timed(mut self, presented_at: DateTime<Utc>, responded_at: DateTime<Utc>) -> Self {
        self.presented_at = Some(presented_at);
        self.responded_at = Some(responded_at);
        self
    }

    pub fn responded_at(mut self, at: DateTime<Utc>) -> Self {
        self.responded_at = Some(at);
        self
    }

    pub fn is_correct(&self) -> bool {
        self.response == self.expected
    }

    /// Response latency in milliseconds, never negative
    pub fn latency_ms(&self) -> Option<f64> {
        if let Some(ms) = self.elapsed_ms {
            return Some(ms.max(0.0));
        }
        match (self.presented_at, self.responded_at) {
            (Some(start), Some(end)) => {
                Some(((end - start).num_microseconds()? as f64 / 1000.0).max(0.0))
            }
            _ => None,
        }
    }
}

/// Integer task score, always within [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskScore(u8);

impl TaskScore {
    pub const MAX: TaskScore = TaskScore(100);

    pub fn new(value: u8) -> Self {
        TaskScore(value.min(100))
    }

    /// Clamp a raw formula value to [0, 100] and round to the nearest integer
    pub fn from_f64(raw: f64) -> Self {
        if raw.is_nan() {
            return TaskScore(0);
        }
        TaskScore(raw.clamp(0.0, 100.0).round() as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TaskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TaskScore> for u8 {
    fn from(score: TaskScore) -> u8 {
        score.0
    }
}

/// The eight task scores by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskScores {
    pub word_recognition: TaskScore,
    pub letter_accuracy: TaskScore,
    pub phoneme_matching: TaskScore,
    pub word_sequencing: TaskScore,
    pub reading_comprehension: TaskScore,
    pub working_memory: TaskScore,
    pub visual_processing: TaskScore,
    pub spelling: TaskScore,
}

impl TaskScores {
    pub fn from_array(scores: [TaskScore; 8]) -> Self {
        let [
            word_recognition,
            letter_accuracy,
            phoneme_matching,
            word_sequencing,
            reading_comprehension,
            working_memory,
            visual_processing,
            spelling,
        ] = scores;
        Self {
            word_recognition,
            letter_accuracy,
            phoneme_matching,
            word_sequencing,
            reading_comprehension,
            working_memory,
            visual_processing,
            spelling,
        }
    }

    /// Scores in battery order
    pub fn to_array(&self) -> [TaskScore; 8] {
        [
            self.word_recognition,
            self.letter_accuracy,
            self.phoneme_matching,
            self.word_sequencing,
            self.reading_comprehension,
            self.working_memory,
            self.visual_processing,
            self.spelling,
        ]
    }

    pub fn get(&self, task: TaskId) -> TaskScore {
        self.to_array()[task.index()]
    }
}

/// Outcome of a completed battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub scores: TaskScores,
    pub overall_average: u8,
    pub tier: DifficultyTier,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_task_numbering() {
        assert_eq!(TaskId::WordRecognition.number(), 1);
        assert_eq!(TaskId::Spelling.number(), 8);
        assert_eq!(TaskId::from_number(6), Some(TaskId::WorkingMemory));
        assert_eq!(TaskId::from_number(0), None);
        assert_eq!(TaskId::from_number(9), None);
        assert_eq!(TaskId::Spelling.next(), None);
        assert_eq!(TaskId::WordSequencing.next(), Some(TaskId::ReadingComprehension));
    }

    #[test]
    fn test_task_score_clamps_and_rounds() {
        assert_eq!(TaskScore::from_f64(-12.0).value(), 0);
        assert_eq!(TaskScore::from_f64(140.0).value(), 100);
        assert_eq!(TaskScore::from_f64(89.5).value(), 90);
        assert_eq!(TaskScore::from_f64(f64::NAN).value(), 0);
        assert_eq!(TaskScore::new(250), TaskScore::MAX);
    }

    #[test]
    fn test_trial_latency_from_timestamps() {
        let start = Utc::now();
        let trial = AssessmentTrial::answered("THEY", "THEY")
            .timed(start, start + Duration::milliseconds(750));
        assert!(trial.is_correct());
        assert_eq!(trial.latency_ms(), Some(750.0));

        let explicit = trial.clone().with_elapsed_ms(420.0);
        assert_eq!(explicit.latency_ms(), Some(420.0));

        assert_eq!(AssessmentTrial::answered("b", "d").latency_ms(), None);
    }

    #[test]
    fn test_trial_json_shape() {
        let trial: AssessmentTrial =
            serde_json::from_str(r#"{ "expected": "WENT", "response": "WANT", "elapsed_ms": 900 }"#)
                .unwrap();
        assert!(!trial.is_correct());
        assert_eq!(trial.elapsed_ms, Some(900.0));
        assert!(trial.options.is_empty());
    }

    #[test]
    fn test_scores_by_name() {
        let raw: [TaskScore; 8] = std::array::from_fn(|i| TaskScore::new(i as u8 * 10));
        let scores = TaskScores::from_array(raw);
        assert_eq!(scores.working_memory.value(), 50);
        assert_eq!(scores.get(TaskId::Spelling).value(), 70);
        assert_eq!(scores.to_array(), raw);
    }
}
