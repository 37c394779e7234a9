use rand::Rng;
use rand::seq::SliceRandom;

use prep_core::model::{Difficulty, Question, StudentProgress, Subject};
use prep_core::rating::RatingModel;

use crate::readiness::ReadinessEstimator;

/// Default number of questions in a practice session.
pub const DEFAULT_SESSION_LENGTH: usize = 10;

/// Readiness below this counts as "behind" and doubles the retry boost.
pub const BEHIND_READINESS: u8 = 70;

const MATCH_BASE: i64 = 1000;
const RETRY_BOOST: i64 = 300;
const RETRY_BOOST_BEHIND: i64 = 600;
const MASTERED_PENALTY: i64 = 200;
const ATTEMPT_PENALTY: i64 = 20;

/// A candidate question with its computed selection priority.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedQuestion {
    pub question: Question,
    pub priority: i64,
}

/// Scores and picks the next batch of practice questions for one subject.
///
/// Selection is two-phase: a deterministic priority ranking over the whole
/// subject pool, then a uniform shuffle of the winning subset so the student
/// cannot infer the ranking from presentation order. The random source is
/// injected, which keeps the ranking assertable in tests.
pub struct SessionSelector<'a> {
    catalog: &'a [Question],
    count: usize,
    model: RatingModel,
}

impl<'a> SessionSelector<'a> {
    #[must_use]
    pub fn new(catalog: &'a [Question]) -> Self {
        Self {
            catalog,
            count: DEFAULT_SESSION_LENGTH,
            model: RatingModel::new(),
        }
    }

    /// Override the number of questions to select.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// The deterministic ranking pass: every catalog question in the subject,
    /// scored against the student's current state, best first, truncated to
    /// the session length.
    ///
    /// Priority per question:
    /// - closeness of its difficulty rating to the student rating (base 1000
    ///   minus the absolute gap),
    /// - a retry boost when the last attempt was wrong (doubled when the
    ///   student is behind their readiness target),
    /// - a penalty when the last attempt was right,
    /// - a growing penalty per prior attempt, for variety.
    #[must_use]
    pub fn rank(
        &self,
        progress: &StudentProgress,
        subject: Subject,
        readiness: u8,
    ) -> Vec<RankedQuestion> {
        let student_rating = progress.rating(subject);
        let is_behind = readiness < BEHIND_READINESS;

        let mut ranked: Vec<RankedQuestion> = self
            .catalog
            .iter()
            .filter(|q| q.subject() == subject)
            .map(|q| {
                let gap =
                    i64::from((self.model.question_rating(q.difficulty()) - student_rating).abs());
                let mut priority = MATCH_BASE - gap;

                match progress.last_result(q.id()) {
                    Some(false) => {
                        priority += if is_behind { RETRY_BOOST_BEHIND } else { RETRY_BOOST };
                    }
                    Some(true) => priority -= MASTERED_PENALTY,
                    None => {}
                }

                priority -= i64::from(progress.attempts(q.id())) * ATTEMPT_PENALTY;

                RankedQuestion {
                    question: q.clone(),
                    priority,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.priority.cmp(&a.priority));
        ranked.truncate(self.count);
        ranked
    }

    /// Selects the session questions: rank, then shuffle the winners.
    ///
    /// An empty subject pool yields an empty list; the caller treats that as
    /// "nothing to practice".
    #[must_use]
    pub fn select<R: Rng + ?Sized>(
        &self,
        progress: &StudentProgress,
        subject: Subject,
        estimator: &ReadinessEstimator,
        rng: &mut R,
    ) -> Vec<Question> {
        let readiness = estimator.readiness(progress);
        let mut selected: Vec<Question> = self
            .rank(progress, subject, readiness)
            .into_iter()
            .map(|ranked| ranked.question)
            .collect();
        selected.shuffle(rng);
        selected
    }

    /// `select` with a thread-local random source.
    #[must_use]
    pub fn select_with_default_rng(
        &self,
        progress: &StudentProgress,
        subject: Subject,
        estimator: &ReadinessEstimator,
    ) -> Vec<Question> {
        let mut rng = rand::rng();
        self.select(progress, subject, estimator, &mut rng)
    }
}

/// Difficulty tier the student should mostly see right now.
///
/// Cutoffs follow the rating band, with one exception: a student who is
/// behind their readiness target but already above 1050 is pushed up to
/// medium to accelerate exposure.
#[must_use]
pub fn recommended_tier(progress: &StudentProgress, subject: Subject, readiness: u8) -> Difficulty {
    let rating = progress.rating(subject);

    if readiness < 60 && rating > 1050 {
        return Difficulty::Medium;
    }

    if rating < 1100 {
        Difficulty::Easy
    } else if rating < 1350 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::QuestionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn question(id: &str, subject: Subject, difficulty: Difficulty) -> Question {
        Question::new(
            QuestionId::new(id),
            subject,
            "Letter Series",
            difficulty,
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            0,
        )
        .unwrap()
    }

    fn small_catalog() -> Vec<Question> {
        vec![
            question("vr001", Subject::VerbalReasoning, Difficulty::Easy),
            question("vr002", Subject::VerbalReasoning, Difficulty::Medium),
            question("vr003", Subject::VerbalReasoning, Difficulty::Hard),
            question("vr004", Subject::VerbalReasoning, Difficulty::Medium),
            question("m001", Subject::Maths, Difficulty::Easy),
            question("m002", Subject::Maths, Difficulty::Hard),
        ]
    }

    #[test]
    fn select_returns_min_of_count_and_pool_size() {
        let catalog = small_catalog();
        let progress = StudentProgress::new();
        let estimator = ReadinessEstimator::new();
        let mut rng = StdRng::seed_from_u64(7);

        let selector = SessionSelector::new(&catalog).with_count(10);
        let selected = selector.select(&progress, Subject::VerbalReasoning, &estimator, &mut rng);
        assert_eq!(selected.len(), 4);

        let selector = SessionSelector::new(&catalog).with_count(2);
        let selected = selector.select(&progress, Subject::VerbalReasoning, &estimator, &mut rng);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_only_returns_requested_subject() {
        let catalog = small_catalog();
        let progress = StudentProgress::new();
        let estimator = ReadinessEstimator::new();
        let mut rng = StdRng::seed_from_u64(7);

        let selected = SessionSelector::new(&catalog).select(
            &progress,
            Subject::Maths,
            &estimator,
            &mut rng,
        );
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|q| q.subject() == Subject::Maths));
    }

    #[test]
    fn empty_pool_yields_empty_selection() {
        let catalog = vec![question("m001", Subject::Maths, Difficulty::Easy)];
        let progress = StudentProgress::new();
        let estimator = ReadinessEstimator::new();
        let mut rng = StdRng::seed_from_u64(7);

        let selected = SessionSelector::new(&catalog).select(
            &progress,
            Subject::English,
            &estimator,
            &mut rng,
        );
        assert!(selected.is_empty());
    }

    #[test]
    fn rank_prefers_matching_difficulty() {
        let catalog = small_catalog();
        let progress = StudentProgress::new();

        // Base rating 1200: medium questions (rating 1200) outrank easy (1000)
        // and hard (1400).
        let ranked = SessionSelector::new(&catalog).rank(&progress, Subject::VerbalReasoning, 80);
        assert_eq!(ranked[0].question.difficulty(), Difficulty::Medium);
        assert_eq!(ranked[1].question.difficulty(), Difficulty::Medium);
        assert_eq!(ranked[0].priority, 1000);
    }

    #[test]
    fn rank_boosts_recently_wrong_questions() {
        let catalog = small_catalog();
        let mut progress = StudentProgress::new();
        progress.record_attempt(&QuestionId::new("vr001"), false);

        let ranked = SessionSelector::new(&catalog).rank(&progress, Subject::VerbalReasoning, 80);

        // Easy question at gap 200 scores 800, +300 retry -20 attempt = 1080,
        // ahead of the untouched mediums at 1000.
        assert_eq!(ranked[0].question.id().as_str(), "vr001");
        assert_eq!(ranked[0].priority, 1080);
    }

    #[test]
    fn retry_boost_doubles_when_behind() {
        let catalog = small_catalog();
        let mut progress = StudentProgress::new();
        progress.record_attempt(&QuestionId::new("vr001"), false);

        let selector = SessionSelector::new(&catalog);
        let ahead = selector.rank(&progress, Subject::VerbalReasoning, BEHIND_READINESS);
        let behind = selector.rank(&progress, Subject::VerbalReasoning, BEHIND_READINESS - 1);

        let find = |ranked: &[RankedQuestion]| {
            ranked
                .iter()
                .find(|r| r.question.id().as_str() == "vr001")
                .unwrap()
                .priority
        };
        assert_eq!(find(&behind) - find(&ahead), RETRY_BOOST_BEHIND - RETRY_BOOST);
    }

    #[test]
    fn rank_penalizes_recently_correct_and_repeated_attempts() {
        let catalog = small_catalog();
        let mut progress = StudentProgress::new();
        for _ in 0..3 {
            progress.record_attempt(&QuestionId::new("vr002"), true);
        }

        let ranked = SessionSelector::new(&catalog).rank(&progress, Subject::VerbalReasoning, 80);
        let vr002 = ranked
            .iter()
            .find(|r| r.question.id().as_str() == "vr002")
            .unwrap();

        // 1000 - 200 mastered - 3 * 20 attempts.
        assert_eq!(vr002.priority, 740);
        // It falls behind its untouched medium twin.
        assert!(ranked[0].question.id().as_str() == "vr004");
    }

    #[test]
    fn shuffle_reorders_but_preserves_the_ranked_set() {
        let catalog = small_catalog();
        let progress = StudentProgress::new();
        let estimator = ReadinessEstimator::new();
        let selector = SessionSelector::new(&catalog).with_count(3);

        let readiness = estimator.readiness(&progress);
        let expected: HashSet<String> = selector
            .rank(&progress, Subject::VerbalReasoning, readiness)
            .into_iter()
            .map(|r| r.question.id().as_str().to_string())
            .collect();

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selected: HashSet<String> = selector
                .select(&progress, Subject::VerbalReasoning, &estimator, &mut rng)
                .into_iter()
                .map(|q| q.id().as_str().to_string())
                .collect();
            assert_eq!(selected, expected);
        }
    }

    #[test]
    fn recommended_tier_follows_rating_band() {
        let mut progress = StudentProgress::new();

        progress.set_rating(Subject::Maths, 1000);
        assert_eq!(recommended_tier(&progress, Subject::Maths, 80), Difficulty::Easy);

        progress.set_rating(Subject::Maths, 1200);
        assert_eq!(recommended_tier(&progress, Subject::Maths, 80), Difficulty::Medium);

        progress.set_rating(Subject::Maths, 1400);
        assert_eq!(recommended_tier(&progress, Subject::Maths, 80), Difficulty::Hard);
    }

    #[test]
    fn behind_students_above_the_floor_are_pushed_to_medium() {
        let mut progress = StudentProgress::new();
        progress.set_rating(Subject::Maths, 1060);
        assert_eq!(recommended_tier(&progress, Subject::Maths, 59), Difficulty::Medium);

        // At or below 1050 the push does not apply.
        progress.set_rating(Subject::Maths, 1050);
        assert_eq!(recommended_tier(&progress, Subject::Maths, 59), Difficulty::Easy);
    }
}
