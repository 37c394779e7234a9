use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use prep_core::model::{Question, QuestionId, Session, SessionId, StudentProgress, Subject};
use prep_core::rating::RatingModel;
use prep_core::time::Clock;

use crate::error::PracticeError;
use crate::gamification::{check_badges, session_xp};

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// What one recorded answer changed, returned for the caller's feedback UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub subject: Subject,
    pub topic: String,
    pub is_correct: bool,
    pub rating_before: i32,
    pub rating_after: i32,
}

//
// ─── WEAK TOPICS ───────────────────────────────────────────────────────────────
//

/// Topics need at least this many attempts before they can rank as weak.
pub const WEAK_TOPIC_MIN_ATTEMPTS: u32 = 2;

/// How many weak topics to surface.
pub const WEAK_TOPIC_LIMIT: usize = 3;

/// A topic and its observed accuracy, for weakness reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicMastery {
    pub topic: String,
    pub mastery_percent: u8,
}

/// The student's weakest topics in a subject, lowest accuracy first.
///
/// Topics with fewer than two recorded attempts are excluded so a single
/// unlucky answer cannot brand a topic weak. At most three topics are
/// returned. Accuracy ties are broken by topic name to keep the order stable.
#[must_use]
pub fn weak_topics(progress: &StudentProgress, subject: Subject) -> Vec<TopicMastery> {
    let Some(scores) = progress.topic_scores(subject) else {
        return Vec::new();
    };

    let mut candidates: Vec<(&String, f64, u8)> = scores
        .iter()
        .filter(|(_, score)| score.total() >= WEAK_TOPIC_MIN_ATTEMPTS)
        .map(|(topic, score)| (topic, score.accuracy(), score.mastery_percent()))
        .collect();

    candidates.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    candidates.truncate(WEAK_TOPIC_LIMIT);

    candidates
        .into_iter()
        .map(|(topic, _, mastery_percent)| TopicMastery {
            topic: topic.clone(),
            mastery_percent,
        })
        .collect()
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// The combined entry points for recording practice activity.
///
/// Owns a clock so session dates and streaks stay deterministic under test,
/// and the rating model so every answer updates skill, attempt history, and
/// topic counters in one step.
pub struct PracticeService {
    clock: Clock,
    model: RatingModel,
}

impl Default for PracticeService {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeService {
    /// Service on the real-time clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::default(),
            model: RatingModel::new(),
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Records one answered question.
    ///
    /// Performs, as a single step from the caller's perspective: the rating
    /// update, the attempt-count bump, the last-result overwrite, and the
    /// topic counter update.
    pub fn record_answer(
        &self,
        progress: &mut StudentProgress,
        question: &Question,
        is_correct: bool,
    ) -> AnswerRecord {
        let subject = question.subject();
        let rating_before = progress.rating(subject);
        let rating_after =
            self.model
                .apply_result(progress, subject, question.difficulty(), is_correct);

        progress.record_attempt(question.id(), is_correct);
        progress.record_topic_result(subject, question.topic(), is_correct);

        AnswerRecord {
            question_id: question.id().clone(),
            subject,
            topic: question.topic().to_owned(),
            is_correct,
            rating_before,
            rating_after,
        }
    }

    /// Closes out a completed session and applies its side effects.
    ///
    /// Builds the session record (computing score and XP), appends it to the
    /// capped history, then applies XP, a gem, the daily streak, and any newly
    /// earned badges.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Session` when the counts are inconsistent
    /// (zero questions, or more correct answers than questions).
    pub fn record_session(
        &self,
        progress: &mut StudentProgress,
        subject: Subject,
        correct: u32,
        total: u32,
        time_taken_secs: u32,
    ) -> Result<Session, PracticeError> {
        let now = self.now();
        let xp = session_xp(correct, total, time_taken_secs);
        let session = Session::from_counts(
            SessionId::new(),
            now,
            subject,
            total,
            correct,
            time_taken_secs,
            xp,
        )?;

        progress.push_session(session.clone());
        progress.add_xp(xp);
        progress.award_gem();
        progress.touch_streak(now);

        for badge in check_badges(progress) {
            progress.award_badge(badge);
        }

        Ok(session)
    }

    /// Spends a gem for a hint. Returns false when the student has none left.
    pub fn use_hint(&self, progress: &mut StudentProgress) -> bool {
        progress.spend_gem()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
