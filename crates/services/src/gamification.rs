use prep_core::model::{Badge, StudentProgress, Subject};
use std::collections::HashSet;

//
// ─── XP ────────────────────────────────────────────────────────────────────────
//

/// XP earned per correct answer.
pub const XP_PER_CORRECT: u32 = 10;

/// Flat bonus for a quick session.
pub const SPEED_BONUS_XP: u32 = 20;

/// A session faster than this many seconds per question earns the bonus.
pub const SPEED_BONUS_SECS_PER_QUESTION: u32 = 45;

/// XP for one completed session: per-correct base plus a speed bonus.
#[must_use]
pub fn session_xp(correct: u32, total: u32, time_taken_secs: u32) -> u32 {
    let base = correct.saturating_mul(XP_PER_CORRECT);
    let budget = total.saturating_mul(SPEED_BONUS_SECS_PER_QUESTION);
    if time_taken_secs < budget {
        base.saturating_add(SPEED_BONUS_XP)
    } else {
        base
    }
}

//
// ─── RANKS ─────────────────────────────────────────────────────────────────────
//

/// A named progression rank unlocked by total XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub min_xp: u32,
    pub label: &'static str,
}

/// The rank ladder, ascending by XP threshold.
pub const RANKS: [Rank; 7] = [
    Rank { min_xp: 0, label: "Rookie Trainer" },
    Rank { min_xp: 500, label: "Autobot Recruit" },
    Rank { min_xp: 1500, label: "Gym Leader" },
    Rank { min_xp: 3000, label: "Cybertron Veteran" },
    Rank { min_xp: 5000, label: "Pokemon Master" },
    Rank { min_xp: 8000, label: "Prime Commander" },
    Rank { min_xp: 12000, label: "Elite Legend" },
];

/// The highest rank whose threshold the XP total meets.
#[must_use]
pub fn rank_for_xp(xp: u32) -> Rank {
    RANKS
        .iter()
        .rev()
        .find(|rank| xp >= rank.min_xp)
        .copied()
        .unwrap_or(RANKS[0])
}

//
// ─── BADGES ────────────────────────────────────────────────────────────────────
//

const LONG_STREAK_DAYS: [(u32, Badge); 3] = [
    (3, Badge::Streak3),
    (7, Badge::Streak7),
    (30, Badge::Streak30),
];

const SUBJECT_MASTERY_SESSIONS: u32 = 10;

/// Badges newly earned by the current progress state.
///
/// Already-held badges are skipped; the caller records the returned ones.
#[must_use]
pub fn check_badges(progress: &StudentProgress) -> Vec<Badge> {
    let mut earned = Vec::new();
    let mut consider = |badge: Badge, achieved: bool| {
        if achieved && !progress.has_badge(badge) {
            earned.push(badge);
        }
    };

    consider(Badge::FirstSession, !progress.sessions().is_empty());

    for (days, badge) in LONG_STREAK_DAYS {
        consider(badge, progress.streak() >= days);
    }

    consider(
        Badge::PerfectScore,
        progress.sessions().iter().any(|s| s.score() == 100),
    );

    consider(
        Badge::MathsMaster,
        subject_session_count(progress, Subject::Maths) >= SUBJECT_MASTERY_SESSIONS,
    );
    consider(
        Badge::VrExpert,
        subject_session_count(progress, Subject::VerbalReasoning) >= SUBJECT_MASTERY_SESSIONS,
    );

    consider(Badge::Xp500, progress.xp() >= 500);
    consider(Badge::Xp2000, progress.xp() >= 2000);

    let practised: HashSet<Subject> = progress.sessions().iter().map(|s| s.subject()).collect();
    consider(Badge::AllSubjects, practised.len() >= Subject::ALL.len());

    earned
}

fn subject_session_count(progress: &StudentProgress, subject: Subject) -> u32 {
    let count = progress
        .sessions()
        .iter()
        .filter(|s| s.subject() == subject)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
