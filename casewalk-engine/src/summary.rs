//! End-of-attempt summary for the debrief screen.

use serde::{Deserialize, Serialize};

use crate::achievements::{self, AchievementId};
use crate::constants::{
    GRADE_EXEMPLARY_ACCURACY_PCT, GRADE_EXEMPLARY_COVERAGE_PCT, GRADE_PROFICIENT_ACCURACY_PCT,
};
use crate::data::CaseMeta;
use crate::numbers::{count_u32, percent_u32};
use crate::policy::AchievementCfg;
use crate::state::{PlayState, PlayStatus};

/// Coarse verdict over a finished or abandoned attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Exemplary,
    Proficient,
    #[default]
    Developing,
}

impl Grade {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exemplary => "exemplary",
            Self::Proficient => "proficient",
            Self::Developing => "developing",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the debrief screen needs, in one serializable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_slug: String,
    pub case_title: String,
    pub status: PlayStatus,
    pub grade: Grade,
    pub score: i32,
    pub time_spent: i32,
    pub estimated_minutes: i32,
    pub accuracy_pct: i32,
    pub coverage_pct: i32,
    pub mistakes: u32,
    pub total_actions: u32,
    pub badges_earned: u32,
    pub badges_total: u32,
}

/// Condense an attempt into the debrief summary.
#[must_use]
pub fn case_summary(state: &PlayState, meta: &CaseMeta, cfg: &AchievementCfg) -> CaseSummary {
    let accuracy_pct = percent_u32(state.correct_actions(), state.total_actions);
    let coverage_pct = percent_u32(
        count_u32(state.visited_stage_slugs.len()),
        count_u32(state.ordered_stage_slugs.len()),
    );
    let badges_earned = count_u32(
        achievements::evaluate_achievements(state, meta, cfg)
            .iter()
            .filter(|badge| badge.status.is_earned())
            .count(),
    );

    CaseSummary {
        case_slug: meta.slug.clone(),
        case_title: meta.title.clone(),
        status: state.status,
        grade: grade_for(state.status, accuracy_pct, coverage_pct),
        score: state.score,
        time_spent: state.time_spent,
        estimated_minutes: meta.estimated_minutes,
        accuracy_pct,
        coverage_pct,
        mistakes: state.mistakes,
        total_actions: state.total_actions,
        badges_earned,
        badges_total: count_u32(AchievementId::ALL.len()),
    }
}

/// Only a completed attempt can grade above `Developing`.
fn grade_for(status: PlayStatus, accuracy_pct: i32, coverage_pct: i32) -> Grade {
    if status != PlayStatus::Completed {
        return Grade::Developing;
    }
    if accuracy_pct >= GRADE_EXEMPLARY_ACCURACY_PCT && coverage_pct >= GRADE_EXEMPLARY_COVERAGE_PCT
    {
        Grade::Exemplary
    } else if accuracy_pct >= GRADE_PROFICIENT_ACCURACY_PCT {
        Grade::Proficient
    } else {
        Grade::Developing
    }
}
