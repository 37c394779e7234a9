use serde::Serialize;
use std::collections::HashMap;

use prep_core::model::{Session, StudentProgress, Subject};
use prep_core::rating::RatingModel;

//
// ─── BENCHMARKS ────────────────────────────────────────────────────────────────
//

/// One school's entrance benchmark within a catchment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolBenchmark {
    pub name: String,
    pub benchmark: u8,
    pub weight: f32,
}

impl SchoolBenchmark {
    #[must_use]
    pub fn new(name: impl Into<String>, benchmark: u8, weight: f32) -> Self {
        Self {
            name: name.into(),
            benchmark,
            weight,
        }
    }
}

/// Static mapping from postcode prefix to the schools in that catchment.
///
/// Unknown or missing postcodes resolve to a documented default pair of
/// benchmarks (85 and 90) so a student without goals still gets a target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkTable {
    entries: HashMap<String, Vec<SchoolBenchmark>>,
}

impl BenchmarkTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in UK grammar-school table keyed by postcode area.
    #[must_use]
    pub fn default_uk() -> Self {
        let mut table = Self::new();
        table.insert(
            "B",
            vec![
                SchoolBenchmark::new("King Edward VI Five Ways", 88, 1.1),
                SchoolBenchmark::new("King Edward VI Camp Hill", 92, 1.2),
                SchoolBenchmark::new("Sutton Coldfield Grammar", 85, 1.0),
            ],
        );
        table.insert(
            "HP",
            vec![
                SchoolBenchmark::new("The Royal Grammar School", 86, 1.1),
                SchoolBenchmark::new("Wycombe High School", 86, 1.1),
                SchoolBenchmark::new("Sir Henry Floyd", 82, 1.0),
            ],
        );
        table.insert(
            "MK",
            vec![
                SchoolBenchmark::new("Aylesbury Grammar", 84, 1.0),
                SchoolBenchmark::new("Sir Henry Floyd", 82, 1.0),
            ],
        );
        table.insert(
            "ME",
            vec![
                SchoolBenchmark::new("Maidstone Grammar", 84, 1.0),
                SchoolBenchmark::new("Rochester Grammar", 88, 1.1),
            ],
        );
        table.insert(
            "TN",
            vec![
                SchoolBenchmark::new("Tunbridge Wells Grammar", 85, 1.0),
                SchoolBenchmark::new("Tonbridge Grammar", 94, 1.3),
            ],
        );
        table
    }

    pub fn insert(&mut self, prefix: impl Into<String>, schools: Vec<SchoolBenchmark>) {
        self.entries.insert(prefix.into(), schools);
    }

    /// Schools for a postcode, falling back to the default pair when the
    /// prefix is unknown or the postcode is absent.
    #[must_use]
    pub fn schools_for(&self, postcode: Option<&str>) -> Vec<SchoolBenchmark> {
        postcode
            .map(catchment_prefix)
            .and_then(|prefix| self.entries.get(&prefix).cloned())
            .unwrap_or_else(default_schools)
    }
}

/// The leading alphabetic area of a postcode, uppercased (`TN4 8XX` -> `TN`).
fn catchment_prefix(postcode: &str) -> String {
    postcode
        .trim()
        .chars()
        .take_while(|c| !c.is_ascii_digit())
        .collect::<String>()
        .to_uppercase()
}

fn default_schools() -> Vec<SchoolBenchmark> {
    vec![
        SchoolBenchmark::new("Standard Grammar School", 85, 1.0),
        SchoolBenchmark::new("Highly Competitive School", 90, 1.2),
    ]
}

//
// ─── READINESS ─────────────────────────────────────────────────────────────────
//

const MOMENTUM_MIN_SESSIONS: usize = 6;
const MOMENTUM_WINDOW: usize = 3;
const MOMENTUM_ADJUSTMENT: f64 = 5.0;
const DECAY_MARGIN: f64 = 5.0;

/// Coarse banding of a readiness score, used by the consuming UI to pick a
/// support level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadinessBand {
    /// 85 and above: exceeding benchmarks.
    Elite,
    /// 65 to 84: approaching the target.
    OnTrack,
    /// Below 65: still building the foundation.
    Foundation,
}

impl ReadinessBand {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => ReadinessBand::Elite,
            65..=84 => ReadinessBand::OnTrack,
            _ => ReadinessBand::Foundation,
        }
    }
}

/// Estimates exam readiness against school-specific benchmarks.
///
/// Readiness is a relative measure: the same mastery level reads differently
/// depending on how competitive the resolved catchment is. A short-term trend
/// adjustment separates two students at identical average mastery by their
/// trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessEstimator {
    benchmarks: BenchmarkTable,
    model: RatingModel,
}

impl Default for ReadinessEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessEstimator {
    /// Estimator over the built-in UK benchmark table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_benchmarks(BenchmarkTable::default_uk())
    }

    /// Estimator over a custom benchmark table.
    #[must_use]
    pub fn with_benchmarks(benchmarks: BenchmarkTable) -> Self {
        Self {
            benchmarks,
            model: RatingModel::new(),
        }
    }

    /// Schools in the student's catchment, resolved from their goals.
    #[must_use]
    pub fn schools(&self, progress: &StudentProgress) -> Vec<SchoolBenchmark> {
        let postcode = progress
            .goals()
            .and_then(|goals| goals.postcode.as_deref());
        self.benchmarks.schools_for(postcode)
    }

    /// The benchmark to beat: the hardest school in the catchment sets the bar.
    #[must_use]
    pub fn target_benchmark(&self, progress: &StudentProgress) -> u8 {
        self.schools(progress)
            .iter()
            .map(|school| school.benchmark)
            .max()
            .unwrap_or(85)
    }

    /// Readiness score in [0, 100].
    ///
    /// Mean subject mastery over all four subjects, taken as a fraction of the
    /// target benchmark, plus or minus a momentum adjustment when at least six
    /// sessions of history exist: the mean score of the latest three sessions
    /// against the three before them.
    #[must_use]
    pub fn readiness(&self, progress: &StudentProgress) -> u8 {
        let target = f64::from(self.target_benchmark(progress));

        let mastery_sum: u32 = Subject::ALL
            .iter()
            .map(|subject| u32::from(self.model.subject_mastery(progress, *subject)))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let current_avg = f64::from(mastery_sum) / Subject::ALL.len() as f64;

        let mut readiness = (current_avg / target) * 100.0;

        let sessions = progress.sessions();
        if sessions.len() >= MOMENTUM_MIN_SESSIONS {
            let last3 = mean_score(&sessions[sessions.len() - MOMENTUM_WINDOW..]);
            let prev3 = mean_score(
                &sessions[sessions.len() - 2 * MOMENTUM_WINDOW..sessions.len() - MOMENTUM_WINDOW],
            );
            if last3 > prev3 {
                readiness += MOMENTUM_ADJUSTMENT;
            } else if last3 < prev3 - DECAY_MARGIN {
                readiness -= MOMENTUM_ADJUSTMENT;
            }
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamped = readiness.round().clamp(0.0, 100.0) as u8;
        clamped
    }

    /// Band for the current readiness score.
    #[must_use]
    pub fn band(&self, progress: &StudentProgress) -> ReadinessBand {
        ReadinessBand::from_score(self.readiness(progress))
    }
}

fn mean_score(sessions: &[Session]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = sessions.len() as f64;
    sessions.iter().map(|s| f64::from(s.score())).sum::<f64>() / len
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::{Session, SessionId, StudyGoals};
    use prep_core::time::fixed_now;

    fn progress_with_postcode(postcode: &str) -> StudentProgress {
        let mut progress = StudentProgress::new();
        progress.set_goals(StudyGoals {
            postcode: Some(postcode.to_string()),
            target_school: None,
        });
        progress
    }

    fn push_scored_session(progress: &mut StudentProgress, correct_of_ten: u32) {
        let session = Session::from_counts(
            SessionId::new(),
            fixed_now(),
            Subject::Maths,
            10,
            correct_of_ten,
            300,
            0,
        )
        .unwrap();
        progress.push_session(session);
    }

    fn set_all_ratings(progress: &mut StudentProgress, rating: i32) {
        for subject in Subject::ALL {
            progress.set_rating(subject, rating);
        }
    }

    #[test]
    fn prefix_extraction_stops_at_first_digit() {
        assert_eq!(catchment_prefix("TN4 8XX"), "TN");
        assert_eq!(catchment_prefix("  b29 6aa "), "B");
        assert_eq!(catchment_prefix("HP11"), "HP");
    }

    #[test]
    fn unknown_postcode_falls_back_to_default_pair() {
        let table = BenchmarkTable::default_uk();
        let schools = table.schools_for(Some("SW1A 1AA"));
        assert_eq!(schools.len(), 2);
        assert_eq!(schools[0].benchmark, 85);
        assert_eq!(schools[1].benchmark, 90);

        let absent = table.schools_for(None);
        assert_eq!(absent, schools);
    }

    #[test]
    fn hardest_school_sets_the_target() {
        let estimator = ReadinessEstimator::new();

        let tn = progress_with_postcode("TN4 8XX");
        assert_eq!(estimator.target_benchmark(&tn), 94);

        let no_goals = StudentProgress::new();
        assert_eq!(estimator.target_benchmark(&no_goals), 90);
    }

    #[test]
    fn readiness_is_zero_for_floor_ratings() {
        let estimator = ReadinessEstimator::new();
        let mut progress = progress_with_postcode("TN1 1AA");
        set_all_ratings(&mut progress, 800);

        assert_eq!(estimator.readiness(&progress), 0);
    }

    #[test]
    fn readiness_scales_against_competitive_benchmark() {
        let estimator = ReadinessEstimator::new();

        // Mastery 50 everywhere; fallback target 90 vs TN target 94.
        let mut default_area = StudentProgress::new();
        set_all_ratings(&mut default_area, 1600);

        let mut tn_area = progress_with_postcode("TN1 1AA");
        set_all_ratings(&mut tn_area, 1600);

        assert!(estimator.readiness(&tn_area) < estimator.readiness(&default_area));
        // 50 / 90 * 100 rounds to 56.
        assert_eq!(estimator.readiness(&default_area), 56);
    }

    #[test]
    fn readiness_caps_at_one_hundred() {
        let mut table = BenchmarkTable::new();
        table.insert("X", vec![SchoolBenchmark::new("Gentle School", 40, 1.0)]);
        let estimator = ReadinessEstimator::with_benchmarks(table);

        let mut progress = progress_with_postcode("X1 2YZ");
        set_all_ratings(&mut progress, 1800);

        assert_eq!(estimator.readiness(&progress), 100);
    }

    #[test]
    fn momentum_requires_six_sessions() {
        let estimator = ReadinessEstimator::new();
        let mut progress = StudentProgress::new();
        set_all_ratings(&mut progress, 1600);
        let base = estimator.readiness(&progress);

        for _ in 0..5 {
            push_scored_session(&mut progress, 9);
        }
        assert_eq!(estimator.readiness(&progress), base);
    }

    #[test]
    fn improving_trend_adds_momentum_bonus() {
        let estimator = ReadinessEstimator::new();
        let mut progress = StudentProgress::new();
        set_all_ratings(&mut progress, 1600);
        let base = estimator.readiness(&progress);

        for correct in [5, 5, 5, 7, 7, 7] {
            push_scored_session(&mut progress, correct);
        }
        assert_eq!(estimator.readiness(&progress), base + 5);
    }

    #[test]
    fn sharp_decline_subtracts_momentum_penalty() {
        let estimator = ReadinessEstimator::new();
        let mut progress = StudentProgress::new();
        set_all_ratings(&mut progress, 1600);
        let base = estimator.readiness(&progress);

        for correct in [8, 8, 8, 6, 6, 6] {
            push_scored_session(&mut progress, correct);
        }
        assert_eq!(estimator.readiness(&progress), base - 5);
    }

    #[test]
    fn mild_decline_within_margin_is_neutral() {
        let estimator = ReadinessEstimator::new();
        let mut progress = StudentProgress::new();
        set_all_ratings(&mut progress, 1600);
        let base = estimator.readiness(&progress);

        // Mean drops by 3.3 points, inside the 5-point margin.
        for correct in [7, 7, 7, 7, 7, 6] {
            push_scored_session(&mut progress, correct);
        }
        assert_eq!(estimator.readiness(&progress), base);
    }

    #[test]
    fn readiness_is_idempotent() {
        let estimator = ReadinessEstimator::new();
        let mut progress = progress_with_postcode("ME1 1AA");
        set_all_ratings(&mut progress, 1450);
        for correct in [4, 9, 6, 8, 5, 7] {
            push_scored_session(&mut progress, correct);
        }

        let first = estimator.readiness(&progress);
        assert_eq!(estimator.readiness(&progress), first);
        assert_eq!(estimator.readiness(&progress), first);
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(ReadinessBand::from_score(100), ReadinessBand::Elite);
        assert_eq!(ReadinessBand::from_score(85), ReadinessBand::Elite);
        assert_eq!(ReadinessBand::from_score(84), ReadinessBand::OnTrack);
        assert_eq!(ReadinessBand::from_score(65), ReadinessBand::OnTrack);
        assert_eq!(ReadinessBand::from_score(64), ReadinessBand::Foundation);
        assert_eq!(ReadinessBand::from_score(0), ReadinessBand::Foundation);
    }
}
