use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{QuestionId, Session, Subject};
use crate::rating::{BASE_RATING, RATING_MAX, RATING_MIN};

/// Maximum number of sessions kept in history; oldest are evicted first.
pub const MAX_SESSION_HISTORY: usize = 100;

/// Hint currency cap.
pub const MAX_GEMS: u8 = 10;

/// Gems a brand-new student starts with.
pub const STARTING_GEMS: u8 = 5;

//
// ─── TOPIC SCORE ───────────────────────────────────────────────────────────────
//

/// Correct/total counters for one topic within a subject.
///
/// Counters only ever grow, and `correct <= total` holds structurally because
/// the only mutation path increments `total` on every recorded attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicScore {
    correct: u32,
    total: u32,
}

impl TopicScore {
    /// Records one attempt against this topic.
    pub fn record(&mut self, is_correct: bool) {
        self.total = self.total.saturating_add(1);
        if is_correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Accuracy for this topic as a rounded percentage; 0 when unattempted.
    #[must_use]
    pub fn mastery_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = ((f64::from(self.correct) / f64::from(self.total)) * 100.0).round() as u8;
        percent
    }

    /// Accuracy as a fraction in [0, 1], used for ordering topics.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total)
    }
}

//
// ─── GOALS ─────────────────────────────────────────────────────────────────────
//

/// Target settings chosen during onboarding.
///
/// The postcode resolves the benchmark catchment; the target school is purely
/// informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyGoals {
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub target_school: Option<String>,
}

//
// ─── BADGES ────────────────────────────────────────────────────────────────────
//

/// Achievement badges a student can earn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "first_session")]
    FirstSession,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "perfect_score")]
    PerfectScore,
    #[serde(rename = "maths_master")]
    MathsMaster,
    #[serde(rename = "vr_expert")]
    VrExpert,
    #[serde(rename = "xp_500")]
    Xp500,
    #[serde(rename = "xp_2000")]
    Xp2000,
    #[serde(rename = "all_subjects")]
    AllSubjects,
}

//
// ─── STUDENT PROGRESS ──────────────────────────────────────────────────────────
//

/// The complete mutable state of one student's practice history.
///
/// This value is owned by the caller: the persistence collaborator loads it,
/// engine operations mutate it through the methods below, and the caller
/// passes the result back onward. The engine keeps no copy of its own.
///
/// Every field deserializes against the default shape, so a partially
/// persisted record (older app version, fresh install) hydrates cleanly
/// instead of failing or leaving holes.
///
/// # Examples
///
/// ```
/// # use prep_core::model::{StudentProgress, Subject};
/// let progress = StudentProgress::new();
/// assert_eq!(progress.rating(Subject::Maths), 1200);
/// assert_eq!(progress.gems(), 5);
/// assert!(progress.sessions().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProgress {
    ratings: HashMap<Subject, i32>,
    attempts: HashMap<QuestionId, u32>,
    last_result: HashMap<QuestionId, bool>,
    topic_mastery: HashMap<Subject, HashMap<String, TopicScore>>,
    sessions: Vec<Session>,
    goals: Option<StudyGoals>,
    xp: u32,
    streak: u32,
    last_activity: Option<DateTime<Utc>>,
    gems: u8,
    badges: Vec<Badge>,
}

impl Default for StudentProgress {
    fn default() -> Self {
        Self {
            ratings: HashMap::new(),
            attempts: HashMap::new(),
            last_result: HashMap::new(),
            topic_mastery: HashMap::new(),
            sessions: Vec::new(),
            goals: None,
            xp: 0,
            streak: 0,
            last_activity: None,
            gems: STARTING_GEMS,
            badges: Vec::new(),
        }
    }
}

impl StudentProgress {
    /// The default record for a brand-new student.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // ── Ratings ──
    //

    /// Current skill rating for a subject, defaulting to the base rating.
    #[must_use]
    pub fn rating(&self, subject: Subject) -> i32 {
        self.ratings.get(&subject).copied().unwrap_or(BASE_RATING)
    }

    /// Stores a rating, clamped into the valid band.
    pub fn set_rating(&mut self, subject: Subject, rating: i32) {
        self.ratings
            .insert(subject, rating.clamp(RATING_MIN, RATING_MAX));
    }

    //
    // ── Per-question history ──
    //

    /// Attempt count for a question; 0 when never attempted.
    #[must_use]
    pub fn attempts(&self, id: &QuestionId) -> u32 {
        self.attempts.get(id).copied().unwrap_or(0)
    }

    /// Correctness of the most recent attempt, if any.
    #[must_use]
    pub fn last_result(&self, id: &QuestionId) -> Option<bool> {
        self.last_result.get(id).copied()
    }

    /// Bumps the attempt counter and overwrites the last result.
    pub fn record_attempt(&mut self, id: &QuestionId, is_correct: bool) {
        let count = self.attempts.entry(id.clone()).or_insert(0);
        *count = count.saturating_add(1);
        self.last_result.insert(id.clone(), is_correct);
    }

    //
    // ── Topic mastery ──
    //

    /// Records one answer against a subject/topic bucket, creating the bucket
    /// with zero counters on first reference.
    pub fn record_topic_result(&mut self, subject: Subject, topic: &str, is_correct: bool) {
        self.topic_mastery
            .entry(subject)
            .or_default()
            .entry(topic.to_owned())
            .or_default()
            .record(is_correct);
    }

    /// Topic counters for a subject, if any attempts were recorded.
    #[must_use]
    pub fn topic_scores(&self, subject: Subject) -> Option<&HashMap<String, TopicScore>> {
        self.topic_mastery.get(&subject)
    }

    //
    // ── Session history ──
    //

    /// Appends a session, evicting the oldest entries beyond the history cap.
    pub fn push_session(&mut self, session: Session) {
        self.sessions.push(session);
        if self.sessions.len() > MAX_SESSION_HISTORY {
            let overflow = self.sessions.len() - MAX_SESSION_HISTORY;
            self.sessions.drain(..overflow);
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The most recent `n` sessions, oldest first.
    #[must_use]
    pub fn recent_sessions(&self, n: usize) -> &[Session] {
        let start = self.sessions.len().saturating_sub(n);
        &self.sessions[start..]
    }

    //
    // ── Goals ──
    //

    #[must_use]
    pub fn goals(&self) -> Option<&StudyGoals> {
        self.goals.as_ref()
    }

    pub fn set_goals(&mut self, goals: StudyGoals) {
        self.goals = Some(goals);
    }

    //
    // ── XP, streak, gems, badges ──
    //

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// Updates the daily streak for activity at `now`.
    ///
    /// Same-day activity is idempotent, the day after the last activity
    /// extends the streak, and any gap resets it to 1.
    pub fn touch_streak(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        let last_day = self.last_activity.map(|t| t.date_naive());

        match last_day {
            Some(day) if day == today => {}
            Some(day) if day.succ_opt() == Some(today) => {
                self.streak = self.streak.saturating_add(1);
                self.last_activity = Some(now);
            }
            _ => {
                self.streak = 1;
                self.last_activity = Some(now);
            }
        }
    }

    #[must_use]
    pub fn gems(&self) -> u8 {
        self.gems
    }

    /// Adds one gem, up to the cap.
    pub fn award_gem(&mut self) {
        self.gems = self.gems.saturating_add(1).min(MAX_GEMS);
    }

    /// Spends one gem. Returns false when none are left.
    pub fn spend_gem(&mut self) -> bool {
        if self.gems == 0 {
            return false;
        }
        self.gems -= 1;
        true
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// Adds a badge if not already earned.
    pub fn award_badge(&mut self, badge: Badge) {
        if !self.has_badge(badge) {
            self.badges.push(badge);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
