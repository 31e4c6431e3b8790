//! Play state: the full mutable record of one attempt at a case.
//!
//! A `PlayState` is owned by exactly one engine instance and mutated only
//! through the engine's selection entry point and reset. It serializes
//! cleanly so callers can persist attempts between sessions; `rehydrate`
//! restores the derived bits after loading.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::graph::CaseGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    #[default]
    InProgress,
    Completed,
    Unsupported,
}

impl PlayStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Unsupported => "unsupported",
        }
    }

    /// Completed and unsupported attempts accept no further selections.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Unsupported)
    }
}

impl fmt::Display for PlayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "unsupported" => Ok(Self::Unsupported),
            _ => Err(()),
        }
    }
}

impl From<PlayStatus> for String {
    fn from(value: PlayStatus) -> Self {
        value.as_str().to_string()
    }
}

/// An immutable audit record of one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based sequence number, unique within one attempt.
    pub id: u32,
    pub stage_slug: String,
    pub option_value: String,
    pub option_label: String,
    pub phase: i32,
    pub correct: bool,
    pub score_delta: i32,
    pub cost_time: i32,
    /// Mastery-energy change actually applied, after clamping, so summing
    /// the timeline reproduces the final energy.
    pub mastery_delta: f32,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub reveals: SmallVec<[String; 4]>,
}

/// Everything one attempt has accumulated: cursor, counters, reasoning
/// traces, the step timeline, and the UI log ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayState {
    #[serde(default)]
    pub status: PlayStatus,
    #[serde(default)]
    pub current_stage_slug: String,
    #[serde(default)]
    pub phase: i32,
    /// Every stage slug in play order; fixed for the life of the attempt.
    #[serde(default)]
    pub ordered_stage_slugs: Vec<String>,
    /// Digest of the content this attempt was started against; zero when the
    /// attempt predates fingerprinting or the content was unplayable.
    #[serde(default)]
    pub case_fingerprint: u64,
    /// Stages acted on, in first-visit order, no duplicates.
    #[serde(default)]
    pub visited_stage_slugs: Vec<String>,
    /// Option values chosen per stage, in selection order.
    #[serde(default)]
    pub selected_options: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub score: i32,
    /// Simulated minutes consumed; only ever grows.
    #[serde(default)]
    pub time_spent: i32,
    #[serde(default)]
    pub mastery_energy: f32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub combo_level: u32,
    #[serde(default)]
    pub total_actions: u32,
    #[serde(default)]
    pub mistakes: u32,
    /// Working diagnoses in first-raised order, no duplicates.
    #[serde(default)]
    pub hypotheses: Vec<String>,
    /// Unlocked findings in discovery order; repeats are kept on purpose.
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub timeline: Vec<Step>,
    #[serde(default)]
    pub last_step: Option<Step>,
    /// i18n log keys for the UI ticker.
    #[serde(default)]
    pub logs: Vec<String>,
}

impl PlayState {
    /// State for a brand-new attempt positioned at the graph entry.
    #[must_use]
    pub fn at_entry(graph: &CaseGraph, mastery_start: f32) -> Self {
        let entry = graph.entry_slug().to_string();
        let phase = graph.stage(&entry).map_or(1, |stage| stage.phase);
        Self {
            status: PlayStatus::InProgress,
            current_stage_slug: entry,
            phase,
            ordered_stage_slugs: graph.ordered_slugs().to_vec(),
            case_fingerprint: graph.fingerprint(),
            mastery_energy: mastery_start,
            ..Self::default()
        }
    }

    /// State representing content the engine cannot play.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            status: PlayStatus::Unsupported,
            ..Self::default()
        }
    }

    /// Record a stage visit, preserving first-visit order without duplicates.
    pub fn mark_visited(&mut self, slug: &str) {
        if !self.visited_stage_slugs.iter().any(|s| s == slug) {
            self.visited_stage_slugs.push(slug.to_string());
        }
    }

    /// Merge hypothesis strings, keeping first-raised order and dropping
    /// repeats.
    pub fn add_hypotheses(&mut self, incoming: &[String]) {
        for hypothesis in incoming {
            if !self.hypotheses.iter().any(|have| have == hypothesis) {
                self.hypotheses.push(hypothesis.clone());
            }
        }
    }

    /// Append revealed evidence in discovery order, repeats included.
    pub fn add_evidence(&mut self, incoming: &[String]) {
        self.evidence.extend(incoming.iter().cloned());
    }

    /// Record an option value under its stage, in selection order.
    pub fn record_selection(&mut self, stage_slug: &str, value: &str) {
        self.selected_options
            .entry(stage_slug.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Append a step to the timeline and track it as the latest.
    pub fn push_step(&mut self, step: Step) {
        self.last_step = Some(step.clone());
        self.timeline.push(step);
    }

    /// The id the next recorded step should carry.
    #[must_use]
    pub fn next_step_id(&self) -> u32 {
        self.timeline
            .last()
            .map_or(1, |step| step.id.saturating_add(1))
    }

    /// Whether the learner has picked `value` at `stage_slug` this attempt.
    #[must_use]
    pub fn has_selected(&self, stage_slug: &str, value: &str) -> bool {
        self.selected_options
            .get(stage_slug)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// Count of correct selections so far.
    #[must_use]
    pub fn correct_actions(&self) -> u32 {
        self.total_actions.saturating_sub(self.mistakes)
    }

    /// Restore derived fields after deserialization from storage.
    pub fn rehydrate(&mut self) {
        if self.last_step.is_none() {
            self.last_step = self.timeline.last().cloned();
        }
    }
}
