//! Reference walkthrough derivation.
//!
//! The golden path is the route an expert would take: at every decision,
//! the first correct option in declaration order. It powers the post-play
//! debrief, where the learner's own choices are laid next to the intended
//! ones.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::CaseGraph;
use crate::state::PlayState;

/// One hop of the reference walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenSegment {
    pub stage_slug: String,
    pub stage_title: String,
    pub phase: i32,
    pub option_value: String,
    pub option_label: String,
    pub is_correct: bool,
}

impl GoldenSegment {
    /// Whether the attempt took this exact hop at some point.
    #[must_use]
    pub fn matches(&self, state: &PlayState) -> bool {
        state.has_selected(&self.stage_slug, &self.option_value)
    }
}

/// Derive the intended route through a case.
///
/// Starting at the entry stage, each stage contributes the first correct
/// option in declaration order, or the first declared option when none is
/// marked correct. Option-less stages fall through to the next stage in
/// order without contributing a segment. A stage is walked at most once,
/// so cyclic links terminate instead of looping.
#[must_use]
pub fn golden_path(graph: &CaseGraph) -> Vec<GoldenSegment> {
    let mut segments = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(graph.entry_slug().to_string());

    while let Some(slug) = cursor.take() {
        if !visited.insert(slug.clone()) {
            break;
        }
        let Some(stage) = graph.stage(&slug) else {
            break;
        };
        let Some(option) = stage
            .options
            .iter()
            .find(|option| option.is_correct)
            .or_else(|| stage.options.first())
        else {
            cursor = graph.next_in_order(&slug).map(str::to_string);
            continue;
        };

        segments.push(GoldenSegment {
            stage_slug: stage.slug.clone(),
            stage_title: stage.title.clone(),
            phase: stage.phase,
            option_value: option.value.clone(),
            option_label: option.label.clone(),
            is_correct: option.is_correct,
        });
        cursor = graph.resolve_next(&slug, option).map(str::to_string);
    }

    segments
}
