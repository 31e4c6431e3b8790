//! Case content shapes and the parse/normalize boundary.
//!
//! Everything in this module is the raw authored form of a case: lenient to
//! deserialize, normalized before the graph layer sees it. Partial payloads
//! fill in defaults; payloads that are not cases at all surface a parse error
//! that the engine turns into an unsupported attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) const DEMO_CASE_DATA: &str = include_str!("../assets/cases/chest_pain.json");

/// The pedagogical kind of a stage.
///
/// Unknown kinds in authored content decode as [`StageType::Info`] so that
/// new authoring vocabulary never breaks older engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum StageType {
    #[default]
    Info,
    Decision,
    Order,
    Diagnosis,
    Management,
    Summary,
}

impl StageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Decision => "decision",
            Self::Order => "order",
            Self::Diagnosis => "diagnosis",
            Self::Management => "management",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "decision" => Ok(Self::Decision),
            "order" => Ok(Self::Order),
            "diagnosis" => Ok(Self::Diagnosis),
            "management" => Ok(Self::Management),
            "summary" => Ok(Self::Summary),
            _ => Err(()),
        }
    }
}

impl From<String> for StageType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

/// Authored outcomes attached to an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OptionOutcomes {
    #[serde(default)]
    pub feedback: Option<String>,
}

/// A selectable option within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContent {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    /// Simulated minutes this action costs the learner.
    #[serde(default)]
    pub cost_time: i32,
    #[serde(default)]
    pub score_delta: i32,
    /// Explicit next stage; absent means fall through in declared order.
    #[serde(default)]
    pub advance_to: Option<String>,
    #[serde(default)]
    pub reveals: Vec<String>,
    #[serde(default)]
    pub hypotheses: Vec<String>,
    #[serde(default)]
    pub outcomes: Option<OptionOutcomes>,
}

impl OptionContent {
    /// Coaching feedback for this option, if the author wrote any.
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.outcomes.as_ref().and_then(|o| o.feedback.as_deref())
    }
}

/// A stage in the authored case graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageContent {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Clinical phase grouping: 1 = diagnosis, 2 = management, and so on.
    #[serde(default = "default_phase")]
    pub phase: i32,
    /// Position within the phase; breaks ties between stages of one phase.
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub stage_type: StageType,
    #[serde(default)]
    pub info: Vec<String>,
    #[serde(default)]
    pub options: Vec<OptionContent>,
}

fn default_phase() -> i32 {
    1
}

/// Descriptive metadata about a case, used by debrief and achievements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaseMeta {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Author's expected completion time; 0 means no budget was declared.
    #[serde(default)]
    pub estimated_minutes: i32,
}

/// Container for a full authored case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaseContent {
    #[serde(default)]
    pub meta: CaseMeta,
    /// Slug of the stage play begins at; absent means the first stage
    /// in phase/order sequence.
    #[serde(default)]
    pub entry_stage: Option<String>,
    #[serde(default)]
    pub stages: Vec<StageContent>,
}

impl CaseContent {
    /// Create empty case content (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load case content from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid case content.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load case content from a pre-parsed JSON value
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not conform to the case shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Load the bundled demonstration case.
    #[must_use]
    pub fn load_demo() -> Self {
        Self::from_json(DEMO_CASE_DATA).unwrap_or_default()
    }

    /// Scrub authored slips before graph validation: trims slug whitespace,
    /// clamps negative time costs to zero, and drops blank strings from the
    /// narrative and reveal lists.
    pub fn normalize(&mut self) {
        if let Some(entry) = self.entry_stage.as_mut() {
            *entry = entry.trim().to_string();
        }
        if self.entry_stage.as_deref() == Some("") {
            self.entry_stage = None;
        }
        for stage in &mut self.stages {
            stage.slug = stage.slug.trim().to_string();
            stage.info.retain(|line| !line.trim().is_empty());
            for option in &mut stage.options {
                option.value = option.value.trim().to_string();
                option.cost_time = option.cost_time.max(0);
                if let Some(advance) = option.advance_to.as_mut() {
                    *advance = advance.trim().to_string();
                }
                if option.advance_to.as_deref() == Some("") {
                    option.advance_to = None;
                }
                option.reveals.retain(|r| !r.trim().is_empty());
                option.hypotheses.retain(|h| !h.trim().is_empty());
            }
        }
    }
}
