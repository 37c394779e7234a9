#![forbid(unsafe_code)]

pub mod booster;
pub mod error;
pub mod gamification;
pub mod practice;
pub mod readiness;
pub mod selector;

pub use prep_core::Clock;

pub use booster::{Booster, check_booster_required};
pub use error::PracticeError;
pub use gamification::{RANKS, Rank, check_badges, rank_for_xp, session_xp};
pub use practice::{AnswerRecord, PracticeService, TopicMastery, weak_topics};
pub use readiness::{BenchmarkTable, ReadinessBand, ReadinessEstimator, SchoolBenchmark};
pub use selector::{RankedQuestion, SessionSelector, recommended_tier};
