//! Centralized tuning constants for the Casewalk case engine.
//!
//! These values define the deterministic math for scoring, mastery energy,
//! and combo progression. Keeping them together ensures that play balance can
//! only be adjusted via code changes reviewed in version control, or via the
//! bundled policy asset that overrides them explicitly.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "CASEWALK_DEBUG_LOGS";
pub(crate) const LOG_CASE_START: &str = "log.case.start";
pub(crate) const LOG_CASE_UNSUPPORTED: &str = "log.case.unsupported";
pub(crate) const LOG_CASE_COMPLETED: &str = "log.case.completed";
pub(crate) const LOG_CASE_RESET: &str = "log.case.reset";
pub(crate) const LOG_CASE_CONTENT_DRIFT: &str = "log.case.content_drift";
pub(crate) const LOG_STAGE_ENTER: &str = "log.stage.enter";
pub(crate) const LOG_OPTION_CORRECT: &str = "log.option.correct";
pub(crate) const LOG_OPTION_MISS: &str = "log.option.miss";
pub(crate) const LOG_COMBO_UP: &str = "log.combo.up";
pub(crate) const LOG_STREAK_BROKEN: &str = "log.streak.broken";

// Mastery energy tuning ----------------------------------------------------
pub(crate) const MASTERY_MAX: f32 = 150.0;
pub(crate) const MASTERY_START: f32 = 0.0;
pub(crate) const MASTERY_CORRECT_BASE: f32 = 12.0;
pub(crate) const MASTERY_COST_TAPER: f32 = 0.6;
pub(crate) const MASTERY_MIN_CORRECT_GAIN: f32 = 4.0;
pub(crate) const MASTERY_COMBO_BONUS: f32 = 2.5;
pub(crate) const MASTERY_MISS_PENALTY: f32 = 9.0;

// Combo tuning -------------------------------------------------------------
pub(crate) const COMBO_THRESHOLDS: [u32; 4] = [3, 6, 10, 15];

// Achievement thresholds ---------------------------------------------------
pub(crate) const ACHIEVEMENT_STREAK_TARGET: u32 = 3;
pub(crate) const ACHIEVEMENT_COVERAGE_RATIO: f32 = 0.8;
pub(crate) const ACHIEVEMENT_MISTAKE_ALLOWANCE: u32 = 1;

// Debrief grading ----------------------------------------------------------
pub(crate) const GRADE_EXEMPLARY_ACCURACY_PCT: i32 = 90;
pub(crate) const GRADE_PROFICIENT_ACCURACY_PCT: i32 = 60;
pub(crate) const GRADE_EXEMPLARY_COVERAGE_PCT: i32 = 80;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f32 = 1e-4;
