use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised when building catalog values from untrusted parts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("unknown subject code: {0}")]
    UnknownSubjectCode(String),

    #[error("invalid difficulty level: {0}")]
    InvalidDifficultyLevel(u8),

    #[error("question topic cannot be empty")]
    EmptyTopic,

    #[error("question must have at least one option")]
    EmptyOptions,

    #[error("correct index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// The four fixed exam subjects.
///
/// Subjects form a closed set; an unknown subject is a parse error at the
/// boundary, never a silent map miss inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "vr")]
    VerbalReasoning,
    #[serde(rename = "nvr")]
    NonVerbalReasoning,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "maths")]
    Maths,
}

impl Subject {
    /// All subjects in declaration order.
    ///
    /// This order is stable and doubles as the deterministic tie-break
    /// wherever subjects with equal scores must be ranked.
    pub const ALL: [Subject; 4] = [
        Subject::VerbalReasoning,
        Subject::NonVerbalReasoning,
        Subject::English,
        Subject::Maths,
    ];

    /// Short code used in persisted records.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Subject::VerbalReasoning => "vr",
            Subject::NonVerbalReasoning => "nvr",
            Subject::English => "en",
            Subject::Maths => "maths",
        }
    }

    /// Human-readable subject name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Subject::VerbalReasoning => "Verbal Reasoning",
            Subject::NonVerbalReasoning => "Non-Verbal Reasoning",
            Subject::English => "English",
            Subject::Maths => "Maths",
        }
    }

    /// Parses a short subject code.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::UnknownSubjectCode` for anything outside the
    /// four known codes.
    pub fn from_code(code: &str) -> Result<Self, QuestionError> {
        match code {
            "vr" => Ok(Subject::VerbalReasoning),
            "nvr" => Ok(Subject::NonVerbalReasoning),
            "en" => Ok(Subject::English),
            "maths" => Ok(Subject::Maths),
            other => Err(QuestionError::UnknownSubjectCode(other.to_string())),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Subject {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::from_code(s)
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Ordinal difficulty tier of a catalog question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Numeric level 1-3, matching the catalog's tier numbering.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Converts a numeric tier (1-3) to a `Difficulty`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidDifficultyLevel` if the value is not 1-3.
    pub fn from_level(level: u8) -> Result<Self, QuestionError> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(QuestionError::InvalidDifficultyLevel(other)),
        }
    }
}

//
// ─── QUESTION ID ───────────────────────────────────────────────────────────────
//

/// Unique identifier of a catalog question (e.g. `vr001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(String);

impl QuestionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable multiple-choice question from the catalog.
///
/// The engine never owns the catalog; questions are supplied fully loaded by
/// the catalog collaborator and only read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    subject: Subject,
    topic: String,
    difficulty: Difficulty,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// Creates a validated question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyTopic` if the topic is blank,
    /// `QuestionError::EmptyOptions` if no answer options are given, and
    /// `QuestionError::CorrectIndexOutOfRange` if `correct_index` does not
    /// point into `options`.
    pub fn new(
        id: QuestionId,
        subject: Subject,
        topic: impl Into<String>,
        difficulty: Difficulty,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(QuestionError::EmptyTopic);
        }
        if options.is_empty() {
            return Err(QuestionError::EmptyOptions);
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            subject,
            topic: topic.trim().to_owned(),
            difficulty,
            options,
            correct_index,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Whether the given option index is the correct answer.
    #[must_use]
    pub fn is_correct_choice(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
