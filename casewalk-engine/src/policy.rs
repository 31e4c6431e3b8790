//! Tunable play policy: mastery energy, combo tiers, achievement thresholds.
//!
//! Coefficients here shape reward pacing, not correctness. The load-bearing
//! guarantees are structural: energy clamps to `[0, max]` on every step,
//! combo level is a pure function of streak that is zero at streak zero and
//! never decreases as streak grows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ACHIEVEMENT_COVERAGE_RATIO, ACHIEVEMENT_MISTAKE_ALLOWANCE, ACHIEVEMENT_STREAK_TARGET,
    COMBO_THRESHOLDS, MASTERY_COMBO_BONUS, MASTERY_CORRECT_BASE, MASTERY_COST_TAPER,
    MASTERY_MAX, MASTERY_MIN_CORRECT_GAIN, MASTERY_MISS_PENALTY, MASTERY_START,
};
use crate::numbers::{i32_to_f32, u32_to_f32};

const DEFAULT_POLICY_DATA: &str = include_str!("../assets/policy.default.json");

/// Errors raised when policy invariants are violated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("combo thresholds must be positive and strictly increasing")]
    ComboThresholds,
}

/// Mastery-energy coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryCfg {
    #[serde(default = "MasteryCfg::default_max")]
    pub max: f32,
    #[serde(default = "MasteryCfg::default_start")]
    pub start: f32,
    /// Reward for a correct selection before tapering.
    #[serde(default = "MasteryCfg::default_correct_base")]
    pub correct_base: f32,
    /// Reward lost per minute of `cost_time`; cheap actions pay more.
    #[serde(default = "MasteryCfg::default_cost_taper")]
    pub cost_taper: f32,
    /// Floor under the tapered reward so slow-but-correct still gains.
    #[serde(default = "MasteryCfg::default_min_correct_gain")]
    pub min_correct_gain: f32,
    /// Extra reward per combo tier held when the selection lands.
    #[serde(default = "MasteryCfg::default_combo_bonus")]
    pub combo_bonus: f32,
    #[serde(default = "MasteryCfg::default_miss_penalty")]
    pub miss_penalty: f32,
}

impl MasteryCfg {
    #[must_use]
    pub const fn default_max() -> f32 {
        MASTERY_MAX
    }

    #[must_use]
    pub const fn default_start() -> f32 {
        MASTERY_START
    }

    #[must_use]
    pub const fn default_correct_base() -> f32 {
        MASTERY_CORRECT_BASE
    }

    #[must_use]
    pub const fn default_cost_taper() -> f32 {
        MASTERY_COST_TAPER
    }

    #[must_use]
    pub const fn default_min_correct_gain() -> f32 {
        MASTERY_MIN_CORRECT_GAIN
    }

    #[must_use]
    pub const fn default_combo_bonus() -> f32 {
        MASTERY_COMBO_BONUS
    }

    #[must_use]
    pub const fn default_miss_penalty() -> f32 {
        MASTERY_MISS_PENALTY
    }

    /// Energy change requested for one selection, before clamping.
    ///
    /// Correct selections earn the base reward tapered by time cost, floored
    /// at the minimum gain, plus the combo bonus per tier. Misses pay a flat
    /// penalty.
    #[must_use]
    pub fn delta_for(&self, correct: bool, cost_time: i32, combo_level: u32) -> f32 {
        if correct {
            let tapered = self.correct_base - self.cost_taper * i32_to_f32(cost_time.max(0));
            tapered.max(self.min_correct_gain) + self.combo_bonus * u32_to_f32(combo_level)
        } else {
            -self.miss_penalty
        }
    }

    /// Validate coefficient bounds before sanitization.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` when any coefficient violates the documented
    /// bounds.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max < 1.0 {
            return Err(PolicyError::MinViolation {
                field: "mastery.max",
                min: 1.0,
                value: self.max,
            });
        }
        if !(0.0..=self.max).contains(&self.start) {
            return Err(PolicyError::RangeViolation {
                field: "mastery.start",
                min: 0.0,
                max: self.max,
                value: self.start,
            });
        }
        if self.correct_base < 0.0 {
            return Err(PolicyError::MinViolation {
                field: "mastery.correct_base",
                min: 0.0,
                value: self.correct_base,
            });
        }
        if self.cost_taper < 0.0 {
            return Err(PolicyError::MinViolation {
                field: "mastery.cost_taper",
                min: 0.0,
                value: self.cost_taper,
            });
        }
        if !(0.0..=self.correct_base).contains(&self.min_correct_gain) {
            return Err(PolicyError::RangeViolation {
                field: "mastery.min_correct_gain",
                min: 0.0,
                max: self.correct_base,
                value: self.min_correct_gain,
            });
        }
        if self.combo_bonus < 0.0 {
            return Err(PolicyError::MinViolation {
                field: "mastery.combo_bonus",
                min: 0.0,
                value: self.combo_bonus,
            });
        }
        if self.miss_penalty < 0.0 {
            return Err(PolicyError::MinViolation {
                field: "mastery.miss_penalty",
                min: 0.0,
                value: self.miss_penalty,
            });
        }
        Ok(())
    }

    /// Force every coefficient back into its documented range.
    pub fn sanitize(&mut self) {
        if !self.max.is_finite() || self.max < 1.0 {
            self.max = Self::default_max();
        }
        if !self.start.is_finite() {
            self.start = Self::default_start();
        }
        self.start = self.start.clamp(0.0, self.max);
        if !self.correct_base.is_finite() || self.correct_base < 0.0 {
            self.correct_base = Self::default_correct_base();
        }
        if !self.cost_taper.is_finite() || self.cost_taper < 0.0 {
            self.cost_taper = Self::default_cost_taper();
        }
        if !self.min_correct_gain.is_finite() || self.min_correct_gain < 0.0 {
            self.min_correct_gain = Self::default_min_correct_gain();
        }
        self.min_correct_gain = self.min_correct_gain.min(self.correct_base);
        if !self.combo_bonus.is_finite() || self.combo_bonus < 0.0 {
            self.combo_bonus = Self::default_combo_bonus();
        }
        if !self.miss_penalty.is_finite() || self.miss_penalty < 0.0 {
            self.miss_penalty = Self::default_miss_penalty();
        }
    }
}

impl Default for MasteryCfg {
    fn default() -> Self {
        Self {
            max: Self::default_max(),
            start: Self::default_start(),
            correct_base: Self::default_correct_base(),
            cost_taper: Self::default_cost_taper(),
            min_correct_gain: Self::default_min_correct_gain(),
            combo_bonus: Self::default_combo_bonus(),
            miss_penalty: Self::default_miss_penalty(),
        }
    }
}

/// Streak thresholds that unlock combo tiers, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboCfg {
    #[serde(default = "ComboCfg::default_thresholds")]
    pub thresholds: Vec<u32>,
}

impl ComboCfg {
    #[must_use]
    pub fn default_thresholds() -> Vec<u32> {
        COMBO_THRESHOLDS.to_vec()
    }

    /// Combo tier for a streak: how many thresholds it has reached.
    #[must_use]
    pub fn level_for(&self, streak: u32) -> u32 {
        let mut level = 0;
        for &threshold in &self.thresholds {
            if streak >= threshold {
                level += 1;
            }
        }
        level
    }

    /// Validate threshold ordering before sanitization.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::ComboThresholds` when a threshold is zero or the
    /// sequence is not strictly increasing.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.thresholds.iter().any(|&t| t == 0) {
            return Err(PolicyError::ComboThresholds);
        }
        if self.thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(PolicyError::ComboThresholds);
        }
        Ok(())
    }

    /// Drop zero thresholds and restore ascending order.
    pub fn sanitize(&mut self) {
        self.thresholds.retain(|&t| t > 0);
        self.thresholds.sort_unstable();
        self.thresholds.dedup();
    }
}

impl Default for ComboCfg {
    fn default() -> Self {
        Self {
            thresholds: Self::default_thresholds(),
        }
    }
}

/// Thresholds feeding the achievement evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementCfg {
    /// Streak length the focus badge asks for.
    #[serde(default = "AchievementCfg::default_streak_target")]
    pub streak_target: u32,
    /// Share of stages that must be visited for the coverage badge.
    #[serde(default = "AchievementCfg::default_coverage_ratio")]
    pub coverage_ratio: f32,
    /// Mistakes tolerated by the clean-run badge.
    #[serde(default = "AchievementCfg::default_mistake_allowance")]
    pub mistake_allowance: u32,
}

impl AchievementCfg {
    #[must_use]
    pub const fn default_streak_target() -> u32 {
        ACHIEVEMENT_STREAK_TARGET
    }

    #[must_use]
    pub const fn default_coverage_ratio() -> f32 {
        ACHIEVEMENT_COVERAGE_RATIO
    }

    #[must_use]
    pub const fn default_mistake_allowance() -> u32 {
        ACHIEVEMENT_MISTAKE_ALLOWANCE
    }

    /// Validate threshold bounds before sanitization.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` when any threshold violates the documented
    /// bounds.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.streak_target == 0 {
            return Err(PolicyError::MinViolation {
                field: "achievements.streak_target",
                min: 1.0,
                value: 0.0,
            });
        }
        if !(0.0..=1.0).contains(&self.coverage_ratio) {
            return Err(PolicyError::RangeViolation {
                field: "achievements.coverage_ratio",
                min: 0.0,
                max: 1.0,
                value: self.coverage_ratio,
            });
        }
        Ok(())
    }

    /// Force thresholds back into their documented ranges.
    pub fn sanitize(&mut self) {
        if self.streak_target == 0 {
            self.streak_target = Self::default_streak_target();
        }
        if !self.coverage_ratio.is_finite() {
            self.coverage_ratio = Self::default_coverage_ratio();
        }
        self.coverage_ratio = self.coverage_ratio.clamp(0.0, 1.0);
    }
}

impl Default for AchievementCfg {
    fn default() -> Self {
        Self {
            streak_target: Self::default_streak_target(),
            coverage_ratio: Self::default_coverage_ratio(),
            mistake_allowance: Self::default_mistake_allowance(),
        }
    }
}

/// The full engine policy bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnginePolicy {
    #[serde(default)]
    pub mastery: MasteryCfg,
    #[serde(default)]
    pub combo: ComboCfg,
    #[serde(default)]
    pub achievements: AchievementCfg,
}

impl EnginePolicy {
    /// Built-in defaults, identical to the bundled policy asset.
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Load the bundled policy asset, falling back to built-in defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        let mut policy: Self = serde_json::from_str(DEFAULT_POLICY_DATA).unwrap_or_default();
        policy.sanitize();
        policy
    }

    /// Parse a policy from JSON; absent sections keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a policy.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first `PolicyError` found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.mastery.validate()?;
        self.combo.validate()?;
        self.achievements.validate()?;
        Ok(())
    }

    /// Sanitize every section.
    pub fn sanitize(&mut self) {
        self.mastery.sanitize();
        self.combo.sanitize();
        self.achievements.sanitize();
    }
}
