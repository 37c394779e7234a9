use serde::Serialize;
use std::collections::HashMap;

use prep_core::model::{Session, StudentProgress, Subject};

use crate::practice::weak_topics;

/// How many recent sessions feed the booster decision.
pub const BOOSTER_WINDOW: usize = 3;

/// Mean accuracy below this over the window triggers a booster.
pub const BOOSTER_THRESHOLD: f64 = 65.0;

/// Bonus XP granted for completing a booster assignment.
pub const BOOSTER_REWARD_XP: u32 = 50;

/// Topic label used when no tracked topic qualifies as weak.
pub const FALLBACK_TOPIC: &str = "General Practice";

/// A targeted remedial assignment, synthesized when accuracy drops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booster {
    pub subject: Subject,
    pub topic: String,
    pub title: String,
    pub description: String,
    pub reward_xp: u32,
    pub is_booster: bool,
}

/// Decides whether the student needs a booster right now.
///
/// A pure decision over the recorded history: fewer than three sessions is
/// insufficient signal; otherwise a mean score below 65 over the last three
/// sessions synthesizes an assignment naming the weakest subject and topic.
/// Re-evaluating against the same history gives the same answer, so nothing
/// is persisted.
#[must_use]
pub fn check_booster_required(progress: &StudentProgress) -> Option<Booster> {
    let recent = progress.recent_sessions(BOOSTER_WINDOW);
    if recent.len() < BOOSTER_WINDOW {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = recent.iter().map(|s| f64::from(s.score())).sum::<f64>() / recent.len() as f64;
    if mean >= BOOSTER_THRESHOLD {
        return None;
    }

    let subject = worst_subject(recent)?;
    let topic = weak_topics(progress, subject)
        .into_iter()
        .next()
        .map_or_else(|| FALLBACK_TOPIC.to_owned(), |weak| weak.topic);

    Some(Booster {
        subject,
        topic: topic.clone(),
        title: format!("Booster Mission: {topic}"),
        description: format!(
            "Accuracy over the last {BOOSTER_WINDOW} sessions dropped below {BOOSTER_THRESHOLD}%. \
             A focused {} session earns {BOOSTER_REWARD_XP} bonus XP.",
            subject.label()
        ),
        reward_xp: BOOSTER_REWARD_XP,
        is_booster: true,
    })
}

/// The subject with the lowest summed score over the recent window.
///
/// Ties resolve in `Subject::ALL` order, so the result does not depend on map
/// iteration order.
fn worst_subject(recent: &[Session]) -> Option<Subject> {
    let mut sums: HashMap<Subject, u32> = HashMap::new();
    for session in recent {
        *sums.entry(session.subject()).or_insert(0) += u32::from(session.score());
    }

    let mut worst: Option<(Subject, u32)> = None;
    for subject in Subject::ALL {
        if let Some(&sum) = sums.get(&subject) {
            match worst {
                Some((_, best)) if sum >= best => {}
                _ => worst = Some((subject, sum)),
            }
        }
    }
    worst.map(|(subject, _)| subject)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
