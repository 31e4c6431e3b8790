//! Achievement evaluation over a play state snapshot.
//!
//! Pure and side-effect free: the evaluator is rerun on every render and
//! must report the same badges for the same snapshot. Thresholds come from
//! [`AchievementCfg`](crate::policy::AchievementCfg) so product tuning does
//! not touch this module.

use serde::{Deserialize, Serialize};

use crate::data::CaseMeta;
use crate::numbers::{count_u32, ratio_u32};
use crate::policy::AchievementCfg;
use crate::state::{PlayState, PlayStatus};

/// Stable badge identifiers, also used as i18n key roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementId {
    FocusedStreak,
    UnderBudget,
    ThoroughWorkup,
    CleanRun,
}

impl AchievementId {
    pub const ALL: [Self; 4] = [
        Self::FocusedStreak,
        Self::UnderBudget,
        Self::ThoroughWorkup,
        Self::CleanRun,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FocusedStreak => "focused-streak",
            Self::UnderBudget => "under-budget",
            Self::ThoroughWorkup => "thorough-workup",
            Self::CleanRun => "clean-run",
        }
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    Earned,
    #[default]
    InProgress,
}

impl AchievementStatus {
    #[must_use]
    pub const fn is_earned(self) -> bool {
        matches!(self, Self::Earned)
    }
}

/// One badge with its current status for the rendered snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title_key: String,
    pub detail_key: String,
    pub status: AchievementStatus,
}

impl Achievement {
    fn with_status(id: AchievementId, earned: bool) -> Self {
        Self {
            id,
            title_key: format!("achievement.{id}.title"),
            detail_key: format!("achievement.{id}.detail"),
            status: if earned {
                AchievementStatus::Earned
            } else {
                AchievementStatus::InProgress
            },
        }
    }
}

/// Evaluate every badge against a play state snapshot.
///
/// Always returns one entry per [`AchievementId`], in declaration order, so
/// the UI can render a stable badge rail.
#[must_use]
pub fn evaluate_achievements(
    state: &PlayState,
    meta: &CaseMeta,
    cfg: &AchievementCfg,
) -> Vec<Achievement> {
    AchievementId::ALL
        .into_iter()
        .map(|id| Achievement::with_status(id, is_earned(id, state, meta, cfg)))
        .collect()
}

fn is_earned(id: AchievementId, state: &PlayState, meta: &CaseMeta, cfg: &AchievementCfg) -> bool {
    match id {
        // Judged on the best run in the timeline, not the live counter, so a
        // late miss cannot revoke a badge already shown to the learner.
        AchievementId::FocusedStreak => best_streak(state) >= cfg.streak_target,
        AchievementId::UnderBudget => {
            state.status == PlayStatus::Completed
                && meta.estimated_minutes > 0
                && state.time_spent <= meta.estimated_minutes
        }
        AchievementId::ThoroughWorkup => {
            let visited = count_u32(state.visited_stage_slugs.len());
            let total = count_u32(state.ordered_stage_slugs.len());
            total > 0 && ratio_u32(visited, total) >= cfg.coverage_ratio
        }
        AchievementId::CleanRun => {
            state.status == PlayStatus::Completed && state.mistakes <= cfg.mistake_allowance
        }
    }
}

fn best_streak(state: &PlayState) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    for step in &state.timeline {
        if step.correct {
            run = run.saturating_add(1);
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}
