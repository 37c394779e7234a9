use crate::model::{Difficulty, StudentProgress, Subject};

//
// ─── CONSTANTS ─────────────────────────────────────────────────────────────────
//

/// Rating assumed for any subject with no recorded history.
pub const BASE_RATING: i32 = 1200;

/// Lower bound of the rating band.
pub const RATING_MIN: i32 = 800;

/// Upper bound of the rating band.
pub const RATING_MAX: i32 = 1800;

/// How fast the student rating moves after each answer.
pub const K_STUDENT: f64 = 32.0;

//
// ─── RATING MODEL ──────────────────────────────────────────────────────────────
//

/// ELO-style skill model: one scalar rating per subject per student.
///
/// Each answered question is treated as a match between the student and the
/// question, where the question's "rating" comes from a fixed map over its
/// difficulty tier. The student's rating moves towards the result by up to
/// `K_STUDENT` points and is clamped into `[RATING_MIN, RATING_MAX]` after
/// every update, so a long run of lucky or unlucky answers can never push it
/// out of band.
///
/// # Examples
///
/// ```
/// # use prep_core::model::{Difficulty, StudentProgress, Subject};
/// # use prep_core::rating::{BASE_RATING, RatingModel};
/// let model = RatingModel::new();
/// let mut progress = StudentProgress::new();
///
/// let updated = model.apply_result(&mut progress, Subject::Maths, Difficulty::Medium, true);
/// assert!(updated > BASE_RATING);
/// assert_eq!(progress.rating(Subject::Maths), updated);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingModel;

impl RatingModel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fixed difficulty-to-rating map: easy 1000, medium 1200, hard 1400.
    #[must_use]
    pub fn question_rating(self, difficulty: Difficulty) -> i32 {
        match difficulty {
            Difficulty::Easy => 1000,
            Difficulty::Medium => 1200,
            Difficulty::Hard => 1400,
        }
    }

    /// Expected probability of a correct answer under the standard ELO curve.
    ///
    /// Equal ratings give 0.5; a question rated 400 points above the student
    /// gives roughly 0.09.
    #[must_use]
    pub fn expected_score(self, student_rating: i32, question_rating: i32) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf(f64::from(question_rating - student_rating) / 400.0))
    }

    /// The rating after one answer, rounded and clamped into the valid band.
    ///
    /// A correct answer never lowers the rating and an incorrect answer never
    /// raises it: the update term `K * (actual - expected)` is positive when
    /// `actual = 1` and negative when `actual = 0`, since the expected score
    /// is strictly between 0 and 1.
    #[must_use]
    pub fn updated_rating(self, current: i32, difficulty: Difficulty, is_correct: bool) -> i32 {
        let expected = self.expected_score(current, self.question_rating(difficulty));
        let actual = if is_correct { 1.0 } else { 0.0 };

        #[allow(clippy::cast_possible_truncation)]
        let next = (f64::from(current) + K_STUDENT * (actual - expected)).round() as i32;

        next.clamp(RATING_MIN, RATING_MAX)
    }

    /// Applies one answer to the stored subject rating and returns the result.
    ///
    /// Unset subjects start from `BASE_RATING`. This only moves the rating;
    /// attempt counters and topic buckets are the caller's separate step.
    pub fn apply_result(
        self,
        progress: &mut StudentProgress,
        subject: Subject,
        difficulty: Difficulty,
        is_correct: bool,
    ) -> i32 {
        let next = self.updated_rating(progress.rating(subject), difficulty, is_correct);
        progress.set_rating(subject, next);
        next
    }

    /// Maps a rating onto a 0-100 mastery percentage.
    ///
    /// Linear over the practical band: 1200 is 0%, 2000 would be 100%, and
    /// everything outside clamps.
    #[must_use]
    pub fn mastery_percent(self, rating: i32) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (f64::from(rating - BASE_RATING) / 8.0).round().clamp(0.0, 100.0) as u8;
        percent
    }

    /// Mastery percentage for a subject's current rating.
    #[must_use]
    pub fn subject_mastery(self, progress: &StudentProgress, subject: Subject) -> u8 {
        self.mastery_percent(progress.rating(subject))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
