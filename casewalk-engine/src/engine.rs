//! The case engine: one attempt, one play state, one way to mutate it.
//!
//! `CaseEngine` owns the play state for a single attempt. Construction from
//! raw content never fails outward; anything structurally unplayable becomes
//! an attempt whose status is `unsupported` and whose retained error says
//! why. Selections validate fully before touching state, so a rejected call
//! is indistinguishable from no call at all.

use thiserror::Error;

use crate::constants::{
    DEBUG_ENV_VAR, LOG_CASE_COMPLETED, LOG_CASE_CONTENT_DRIFT, LOG_CASE_RESET, LOG_CASE_START,
    LOG_CASE_UNSUPPORTED, LOG_COMBO_UP, LOG_OPTION_CORRECT, LOG_OPTION_MISS, LOG_STAGE_ENTER,
    LOG_STREAK_BROKEN,
};
use crate::data::{CaseContent, OptionContent, StageContent};
use crate::graph::{CaseGraph, GraphError};
use crate::policy::EnginePolicy;
use crate::state::{PlayState, PlayStatus, Step};

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

/// Why construction could not produce a playable attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaseError {
    #[error("case content could not be parsed: {0}")]
    Content(String),
    #[error("case graph failed validation: {0}")]
    Graph(#[from] GraphError),
}

/// Drives one attempt at one case.
#[derive(Debug, Clone)]
pub struct CaseEngine {
    graph: Option<CaseGraph>,
    policy: EnginePolicy,
    state: PlayState,
    error: Option<CaseError>,
}

impl CaseEngine {
    /// Engine over an already-validated graph, positioned at its entry.
    #[must_use]
    pub fn new(graph: CaseGraph, policy: EnginePolicy) -> Self {
        let mut state = PlayState::at_entry(&graph, policy.mastery.start);
        state.logs.push(LOG_CASE_START.to_string());
        Self {
            graph: Some(graph),
            policy,
            state,
            error: None,
        }
    }

    /// Engine from parsed content; structural problems yield an unsupported
    /// attempt rather than an error.
    #[must_use]
    pub fn from_content(content: CaseContent, policy: EnginePolicy) -> Self {
        match CaseGraph::build(content) {
            Ok(graph) => Self::new(graph, policy),
            Err(err) => Self::unplayable(policy, CaseError::Graph(err)),
        }
    }

    /// Engine from a pre-parsed JSON value; never panics on foreign shapes.
    #[must_use]
    pub fn from_value(value: &serde_json::Value, policy: EnginePolicy) -> Self {
        match CaseContent::from_value(value) {
            Ok(content) => Self::from_content(content, policy),
            Err(err) => Self::unplayable(policy, CaseError::Content(err.to_string())),
        }
    }

    /// Engine from raw JSON text; never panics on malformed payloads.
    #[must_use]
    pub fn from_json(json: &str, policy: EnginePolicy) -> Self {
        match CaseContent::from_json(json) {
            Ok(content) => Self::from_content(content, policy),
            Err(err) => Self::unplayable(policy, CaseError::Content(err.to_string())),
        }
    }

    /// Rebuild an engine around a previously persisted attempt.
    ///
    /// If the content behind `graph` no longer matches the content the
    /// attempt was recorded against, the attempt continues but the drift is
    /// noted in the log ledger.
    #[must_use]
    pub fn from_state(graph: CaseGraph, policy: EnginePolicy, mut state: PlayState) -> Self {
        state.rehydrate();
        let fingerprint = graph.fingerprint();
        if state.case_fingerprint != 0 && state.case_fingerprint != fingerprint {
            state.logs.push(LOG_CASE_CONTENT_DRIFT.to_string());
        }
        state.case_fingerprint = fingerprint;
        Self {
            graph: Some(graph),
            policy,
            state,
            error: None,
        }
    }

    fn unplayable(policy: EnginePolicy, error: CaseError) -> Self {
        let mut state = PlayState::unsupported();
        state.logs.push(LOG_CASE_UNSUPPORTED.to_string());
        #[cfg(debug_assertions)]
        if debug_log_enabled() {
            println!("Case rejected at construction: {error}");
        }
        Self {
            graph: None,
            policy,
            state,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn state(&self) -> &PlayState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> PlayStatus {
        self.state.status
    }

    #[must_use]
    pub fn graph(&self) -> Option<&CaseGraph> {
        self.graph.as_ref()
    }

    #[must_use]
    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// The construction error behind an unsupported attempt, if any.
    #[must_use]
    pub fn content_error(&self) -> Option<&CaseError> {
        self.error.as_ref()
    }

    /// The stage the attempt is currently on, for rendering.
    #[must_use]
    pub fn current_stage(&self) -> Option<&StageContent> {
        self.graph
            .as_ref()
            .and_then(|graph| graph.stage(&self.state.current_stage_slug))
    }

    /// Surrender the play state, consuming the engine.
    #[must_use]
    pub fn into_state(self) -> PlayState {
        self.state
    }

    /// Apply the learner's selection on the current stage.
    ///
    /// Returns the recorded step, or `None` when the attempt is not in
    /// progress or the value does not exist on the current stage. Rejected
    /// calls change nothing.
    pub fn select_option(&mut self, option_value: &str) -> Option<Step> {
        let stage_slug = self.state.current_stage_slug.clone();
        self.select_option_at(&stage_slug, option_value)
    }

    /// Apply a selection against an explicitly named stage.
    ///
    /// Tolerates UI calls issued against a stage the engine has already
    /// advanced past: the stage only has to exist and carry the option.
    pub fn select_option_at(&mut self, stage_slug: &str, option_value: &str) -> Option<Step> {
        if self.state.status.is_terminal() {
            return None;
        }
        let graph = self.graph.as_ref()?;
        let stage = graph.stage(stage_slug)?;
        let option = stage.options.iter().find(|o| o.value == option_value)?;
        Some(apply_selection(
            &mut self.state,
            graph,
            stage,
            option,
            &self.policy,
        ))
    }

    /// Discard the attempt and start over from the entry stage.
    ///
    /// Against unplayable content this refreshes the unsupported state; the
    /// status never leaves `unsupported` while the content stays invalid.
    pub fn reset(&mut self) {
        self.state = match self.graph.as_ref() {
            Some(graph) => {
                let mut state = PlayState::at_entry(graph, self.policy.mastery.start);
                state.logs.push(LOG_CASE_RESET.to_string());
                state
            }
            None => {
                let mut state = PlayState::unsupported();
                state.logs.push(LOG_CASE_UNSUPPORTED.to_string());
                state
            }
        };
    }
}

/// Apply one validated selection to the play state and record its step.
///
/// This is the single transition behind [`CaseEngine::select_option`].
/// Callers must already have checked that the state is in progress, that
/// `stage` belongs to `graph`, and that `option` belongs to `stage`; from
/// there the transition is infallible, which is what makes a selection
/// atomic.
pub fn apply_selection(
    state: &mut PlayState,
    graph: &CaseGraph,
    stage: &StageContent,
    option: &OptionContent,
    policy: &EnginePolicy,
) -> Step {
    #[cfg(debug_assertions)]
    let (score_before, energy_before) = (state.score, state.mastery_energy);

    state.record_selection(&stage.slug, &option.value);
    state.score = state.score.saturating_add(option.score_delta);
    state.time_spent = state.time_spent.saturating_add(option.cost_time);

    if option.is_correct {
        state.streak = state.streak.saturating_add(1);
        state.logs.push(LOG_OPTION_CORRECT.to_string());
    } else {
        if state.streak > 0 {
            state.logs.push(LOG_STREAK_BROKEN.to_string());
        }
        state.streak = 0;
        state.mistakes = state.mistakes.saturating_add(1);
        state.logs.push(LOG_OPTION_MISS.to_string());
    }

    let combo_before = state.combo_level;
    state.combo_level = policy.combo.level_for(state.streak);
    if state.combo_level > combo_before {
        state.logs.push(LOG_COMBO_UP.to_string());
    }

    let requested = policy
        .mastery
        .delta_for(option.is_correct, option.cost_time, state.combo_level);
    let before = state.mastery_energy;
    state.mastery_energy = (before + requested).clamp(0.0, policy.mastery.max);
    let applied = state.mastery_energy - before;

    state.add_evidence(&option.reveals);
    state.add_hypotheses(&option.hypotheses);

    let step = Step {
        id: state.next_step_id(),
        stage_slug: stage.slug.clone(),
        option_value: option.value.clone(),
        option_label: option.label.clone(),
        phase: stage.phase,
        correct: option.is_correct,
        score_delta: option.score_delta,
        cost_time: option.cost_time,
        mastery_delta: applied,
        feedback: option.feedback().map(str::to_string),
        reveals: option.reveals.iter().cloned().collect(),
    };
    state.push_step(step.clone());
    state.total_actions = state.total_actions.saturating_add(1);
    state.mark_visited(&stage.slug);

    match graph.resolve_next(&stage.slug, option) {
        Some(next) => {
            state.current_stage_slug = next.to_string();
            if let Some(next_stage) = graph.stage(next) {
                state.phase = next_stage.phase;
            }
            state.logs.push(LOG_STAGE_ENTER.to_string());
        }
        None => {
            state.status = PlayStatus::Completed;
            state.logs.push(LOG_CASE_COMPLETED.to_string());
        }
    }

    #[cfg(debug_assertions)]
    if debug_log_enabled() {
        println!(
            "Stage '{}' option '{}' applied score {} -> {}, energy {:.1} -> {:.1}",
            stage.slug, option.value, score_before, state.score, energy_before, state.mastery_energy
        );
    }

    step
}

/// Rebuild a play state by replaying recorded steps against a graph.
///
/// Steps that no longer validate (content changed underneath the recording)
/// are skipped, mirroring the live engine's silent-rejection contract.
#[must_use]
pub fn replay_timeline(graph: &CaseGraph, policy: &EnginePolicy, steps: &[Step]) -> PlayState {
    let mut engine = CaseEngine::new(graph.clone(), policy.clone());
    for step in steps {
        let _ = engine.select_option_at(&step.stage_slug, &step.option_value);
    }
    engine.into_state()
}
