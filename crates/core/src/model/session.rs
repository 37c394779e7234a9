use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::model::Subject;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("session must contain at least one question")]
    ZeroTotal,

    #[error("correct count ({correct}) exceeds total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("session score {0} is outside 0-100")]
    ScoreOutOfRange(u8),
}

/// Unique identifier for a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable record of one completed practice session.
///
/// Appended to `StudentProgress` history and never mutated afterwards. The
/// score is the rounded accuracy percentage, 0-100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    date: DateTime<Utc>,
    subject: Subject,
    total: u32,
    correct: u32,
    score: u8,
    time_taken_secs: u32,
    xp_gained: u32,
}

impl Session {
    /// Builds a session record from raw answer counts, computing the score.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError::ZeroTotal` for an empty session and
    /// `SessionRecordError::CountMismatch` if `correct > total`.
    pub fn from_counts(
        id: SessionId,
        date: DateTime<Utc>,
        subject: Subject,
        total: u32,
        correct: u32,
        time_taken_secs: u32,
        xp_gained: u32,
    ) -> Result<Self, SessionRecordError> {
        if total == 0 {
            return Err(SessionRecordError::ZeroTotal);
        }
        if correct > total {
            return Err(SessionRecordError::CountMismatch { correct, total });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = ((f64::from(correct) / f64::from(total)) * 100.0).round() as u8;

        Ok(Self {
            id,
            date,
            subject,
            total,
            correct,
            score,
            time_taken_secs,
            xp_gained,
        })
    }

    /// Rehydrates a session record built elsewhere, re-checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError` if the counts or score are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        date: DateTime<Utc>,
        subject: Subject,
        total: u32,
        correct: u32,
        score: u8,
        time_taken_secs: u32,
        xp_gained: u32,
    ) -> Result<Self, SessionRecordError> {
        if total == 0 {
            return Err(SessionRecordError::ZeroTotal);
        }
        if correct > total {
            return Err(SessionRecordError::CountMismatch { correct, total });
        }
        if score > 100 {
            return Err(SessionRecordError::ScoreOutOfRange(score));
        }

        Ok(Self {
            id,
            date,
            subject,
            total,
            correct,
            score,
            time_taken_secs,
            xp_gained,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Accuracy percentage, 0-100.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn xp_gained(&self) -> u32 {
        self.xp_gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn from_counts_computes_rounded_score() {
        let session =
            Session::from_counts(SessionId::new(), fixed_now(), Subject::Maths, 3, 1, 120, 10)
                .unwrap();

        // 1/3 rounds to 33
        assert_eq!(session.score(), 33);
        assert_eq!(session.total(), 3);
        assert_eq!(session.correct(), 1);
    }

    #[test]
    fn from_counts_full_marks() {
        let session = Session::from_counts(
            SessionId::new(),
            fixed_now(),
            Subject::English,
            10,
            10,
            300,
            120,
        )
        .unwrap();
        assert_eq!(session.score(), 100);
    }

    #[test]
    fn from_counts_rejects_zero_total() {
        let err = Session::from_counts(SessionId::new(), fixed_now(), Subject::Maths, 0, 0, 0, 0)
            .unwrap_err();
        assert_eq!(err, SessionRecordError::ZeroTotal);
    }

    #[test]
    fn from_counts_rejects_correct_above_total() {
        let err = Session::from_counts(SessionId::new(), fixed_now(), Subject::Maths, 5, 6, 0, 0)
            .unwrap_err();
        assert_eq!(
            err,
            SessionRecordError::CountMismatch {
                correct: 6,
                total: 5
            }
        );
    }

    #[test]
    fn from_persisted_rejects_impossible_score() {
        let err = Session::from_persisted(
            SessionId::new(),
            fixed_now(),
            Subject::Maths,
            10,
            5,
            120,
            60,
            0,
        )
        .unwrap_err();
        assert_eq!(err, SessionRecordError::ScoreOutOfRange(120));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
