//! Validated, immutable runtime form of a case.
//!
//! `CaseGraph::build` is the only way to obtain a graph: it normalizes the
//! authored content, orders stages by phase and order index, and rejects the
//! structural damage that would make play undefined (duplicate slugs, broken
//! advance targets, no completion reachable from the entry). Everything the
//! engine and the debrief walks do afterwards can assume those invariants.

use crate::data::{CaseContent, CaseMeta, OptionContent, StageContent};
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hasher;
use thiserror::Error;
use twox_hash::XxHash64;

/// Structural problems that make authored content unplayable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("case has no stages")]
    NoStages,
    #[error("stage '{title}' has an empty slug")]
    EmptySlug { title: String },
    #[error("duplicate stage slug '{slug}'")]
    DuplicateSlug { slug: String },
    #[error("stage '{stage}' declares option value '{value}' more than once")]
    DuplicateOption { stage: String, value: String },
    #[error("entry stage '{entry}' does not exist")]
    EntryUnresolvable { entry: String },
    #[error("stage '{stage}' option '{value}' advances to unknown stage '{target}'")]
    DanglingAdvance {
        stage: String,
        value: String,
        target: String,
    },
    #[error("no completion is reachable from entry stage '{entry}'")]
    NoTerminalPath { entry: String },
}

/// An immutable case graph: stages in play order plus a slug index.
///
/// Stage order is phase, then order index, then declaration order, and the
/// slug index always points into that ordering, so positional fall-through
/// and slug lookup agree by construction.
#[derive(Debug, Clone)]
pub struct CaseGraph {
    meta: CaseMeta,
    stages: Vec<StageContent>,
    index: HashMap<String, usize>,
    ordered_slugs: Vec<String>,
    entry_slug: String,
}

impl CaseGraph {
    /// Normalize and validate authored content into a playable graph.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] describing the first structural violation
    /// found; the engine surfaces any such error as an unsupported attempt.
    pub fn build(content: CaseContent) -> Result<Self, GraphError> {
        let mut content = content;
        content.normalize();
        let CaseContent {
            meta,
            entry_stage,
            mut stages,
        } = content;

        if stages.is_empty() {
            return Err(GraphError::NoStages);
        }
        for stage in &stages {
            if stage.slug.is_empty() {
                return Err(GraphError::EmptySlug {
                    title: stage.title.clone(),
                });
            }
        }

        // Stable sort keeps declaration order for (phase, order_index) ties.
        stages.sort_by_key(|stage| (stage.phase, stage.order_index));

        let mut index = HashMap::with_capacity(stages.len());
        for (pos, stage) in stages.iter().enumerate() {
            if index.insert(stage.slug.clone(), pos).is_some() {
                return Err(GraphError::DuplicateSlug {
                    slug: stage.slug.clone(),
                });
            }
            let mut seen_values = HashSet::new();
            for option in &stage.options {
                if !seen_values.insert(option.value.as_str()) {
                    return Err(GraphError::DuplicateOption {
                        stage: stage.slug.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }

        for stage in &stages {
            for option in &stage.options {
                if let Some(target) = option.advance_to.as_deref()
                    && !index.contains_key(target)
                {
                    return Err(GraphError::DanglingAdvance {
                        stage: stage.slug.clone(),
                        value: option.value.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        let entry_slug = match entry_stage {
            Some(entry) => {
                if !index.contains_key(&entry) {
                    return Err(GraphError::EntryUnresolvable { entry });
                }
                entry
            }
            None => stages[0].slug.clone(),
        };

        validate_terminal_path(&stages, &index, &entry_slug)?;

        let ordered_slugs = stages.iter().map(|stage| stage.slug.clone()).collect();
        Ok(Self {
            meta,
            stages,
            index,
            ordered_slugs,
            entry_slug,
        })
    }

    #[must_use]
    pub fn meta(&self) -> &CaseMeta {
        &self.meta
    }

    #[must_use]
    pub fn entry_slug(&self) -> &str {
        &self.entry_slug
    }

    /// Stages in play order (phase, then order index, then declaration).
    #[must_use]
    pub fn stages(&self) -> &[StageContent] {
        &self.stages
    }

    /// Stage slugs in the same order as [`CaseGraph::stages`].
    #[must_use]
    pub fn ordered_slugs(&self) -> &[String] {
        &self.ordered_slugs
    }

    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    #[must_use]
    pub fn stage(&self, slug: &str) -> Option<&StageContent> {
        self.index.get(slug).and_then(|&pos| self.stages.get(pos))
    }

    /// The stage that positionally follows `slug`, crossing phase boundaries.
    #[must_use]
    pub fn next_in_order(&self, slug: &str) -> Option<&str> {
        let pos = *self.index.get(slug)?;
        self.stages.get(pos + 1).map(|stage| stage.slug.as_str())
    }

    /// Resolve the stage that follows `from` once `option` is selected.
    ///
    /// An explicit advance target that no longer resolves counts as having no
    /// next stage, so damaged links degrade to early completion instead of a
    /// stuck attempt.
    #[must_use]
    pub fn resolve_next(&self, from: &str, option: &OptionContent) -> Option<&str> {
        match option.advance_to.as_deref() {
            Some(target) => self
                .index
                .get_key_value(target)
                .map(|(slug, _)| slug.as_str()),
            None => self.next_in_order(from),
        }
    }

    /// Stable digest of the normalized content behind this graph.
    ///
    /// Attempts are stamped with it so a resume against edited content can be
    /// detected. Equal content always digests equally within one build of the
    /// crate; the value is not a cross-version contract.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let bytes = serde_json::to_vec(&(&self.meta, &self.stages)).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        hasher.finish()
    }
}

/// Breadth-first walk over every selectable edge, looking for at least one
/// option whose resolution is "no next stage" (the completion trigger).
fn validate_terminal_path(
    stages: &[StageContent],
    index: &HashMap<String, usize>,
    entry_slug: &str,
) -> Result<(), GraphError> {
    let Some(&entry_pos) = index.get(entry_slug) else {
        return Err(GraphError::EntryUnresolvable {
            entry: entry_slug.to_string(),
        });
    };

    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([entry_pos]);
    while let Some(pos) = queue.pop_front() {
        if !seen.insert(pos) {
            continue;
        }
        let Some(stage) = stages.get(pos) else {
            continue;
        };
        for option in &stage.options {
            match option.advance_to.as_deref() {
                Some(target) => {
                    if let Some(&next) = index.get(target) {
                        queue.push_back(next);
                    }
                }
                None => {
                    if pos + 1 < stages.len() {
                        queue.push_back(pos + 1);
                    } else {
                        return Ok(());
                    }
                }
            }
        }
    }

    Err(GraphError::NoTerminalPath {
        entry: entry_slug.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StageType;

    fn make_option(value: &str, advance_to: Option<&str>) -> OptionContent {
        OptionContent {
            value: value.to_string(),
            label: value.to_uppercase(),
            description: None,
            detail: None,
            is_correct: false,
            cost_time: 0,
            score_delta: 0,
            advance_to: advance_to.map(str::to_string),
            reveals: Vec::new(),
            hypotheses: Vec::new(),
            outcomes: None,
        }
    }

    fn make_stage(slug: &str, phase: i32, order_index: i32, options: Vec<OptionContent>) -> StageContent {
        StageContent {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            subtitle: None,
            phase,
            order_index,
            stage_type: StageType::Decision,
            info: Vec::new(),
            options,
        }
    }

    fn make_case(stages: Vec<StageContent>) -> CaseContent {
        CaseContent {
            meta: CaseMeta::default(),
            entry_stage: None,
            stages,
        }
    }

    #[test]
    fn build_orders_by_phase_then_order_index() {
        let graph = CaseGraph::build(make_case(vec![
            make_stage("late", 2, 1, vec![make_option("go", None)]),
            make_stage("mid", 1, 5, vec![make_option("go", None)]),
            make_stage("first", 1, 1, vec![make_option("go", None)]),
        ]))
        .unwrap();

        assert_eq!(graph.ordered_slugs(), ["first", "mid", "late"]);
        assert_eq!(graph.entry_slug(), "first");
        assert!(graph.contains("mid"));
        assert!(!graph.contains("absent"));
        assert_eq!(graph.next_in_order("mid"), Some("late"));
        assert_eq!(graph.next_in_order("late"), None);
    }

    #[test]
    fn build_rejects_empty_and_duplicate_content() {
        assert!(matches!(
            CaseGraph::build(CaseContent::empty()),
            Err(GraphError::NoStages)
        ));

        let dup = CaseGraph::build(make_case(vec![
            make_stage("s1", 1, 1, vec![make_option("go", None)]),
            make_stage("s1", 1, 2, vec![make_option("go", None)]),
        ]));
        assert!(matches!(dup, Err(GraphError::DuplicateSlug { slug }) if slug == "s1"));

        let dup_option = CaseGraph::build(make_case(vec![make_stage(
            "s1",
            1,
            1,
            vec![make_option("go", None), make_option("go", None)],
        )]));
        assert!(
            matches!(dup_option, Err(GraphError::DuplicateOption { stage, value }) if stage == "s1" && value == "go")
        );
    }

    #[test]
    fn build_rejects_unresolvable_entry_and_dangling_advance() {
        let mut content = make_case(vec![make_stage("s1", 1, 1, vec![make_option("go", None)])]);
        content.entry_stage = Some("missing".to_string());
        assert!(matches!(
            CaseGraph::build(content),
            Err(GraphError::EntryUnresolvable { entry }) if entry == "missing"
        ));

        let dangling = CaseGraph::build(make_case(vec![make_stage(
            "s1",
            1,
            1,
            vec![make_option("go", Some("nowhere"))],
        )]));
        assert!(matches!(
            dangling,
            Err(GraphError::DanglingAdvance { target, .. }) if target == "nowhere"
        ));
    }

    #[test]
    fn build_rejects_cycles_with_no_exit() {
        let looped = CaseGraph::build(make_case(vec![
            make_stage("a", 1, 1, vec![make_option("again", Some("b"))]),
            make_stage("b", 1, 2, vec![make_option("back", Some("a"))]),
        ]));
        assert!(matches!(looped, Err(GraphError::NoTerminalPath { entry }) if entry == "a"));
    }

    #[test]
    fn build_tolerates_optionless_side_branches() {
        // The reading-room stage is a dead end, but the main line completes.
        let graph = CaseGraph::build(make_case(vec![
            make_stage(
                "start",
                1,
                1,
                vec![make_option("go", Some("end")), make_option("read", Some("library"))],
            ),
            make_stage("library", 1, 2, vec![]),
            make_stage("end", 2, 1, vec![make_option("finish", None)]),
        ]));
        assert!(graph.is_ok());
    }

    #[test]
    fn resolve_next_prefers_explicit_links_and_degrades_gracefully() {
        let graph = CaseGraph::build(make_case(vec![
            make_stage("s1", 1, 1, vec![make_option("jump", Some("s3"))]),
            make_stage("s2", 1, 2, vec![make_option("go", None)]),
            make_stage("s3", 2, 1, vec![make_option("finish", None)]),
        ]))
        .unwrap();

        let jump = &graph.stage("s1").unwrap().options[0];
        assert_eq!(graph.resolve_next("s1", jump), Some("s3"));

        let fall_through = &graph.stage("s2").unwrap().options[0];
        assert_eq!(graph.resolve_next("s2", fall_through), Some("s3"));

        let finish = &graph.stage("s3").unwrap().options[0];
        assert_eq!(graph.resolve_next("s3", finish), None);

        // A link damaged after validation behaves like "no next stage".
        let broken = make_option("broken", Some("gone"));
        assert_eq!(graph.resolve_next("s2", &broken), None);
    }

    #[test]
    fn fingerprint_tracks_content_identity() {
        let build = |label: &str| {
            CaseGraph::build(make_case(vec![make_stage(
                "s1",
                1,
                1,
                vec![OptionContent {
                    label: label.to_string(),
                    ..make_option("close", None)
                }],
            )]))
            .unwrap()
        };

        let a = build("Close the case");
        let b = build("Close the case");
        let c = build("Close the chart");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint(), "edited content re-digests");
    }
}
