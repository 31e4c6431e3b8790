//! Casewalk Case Engine
//!
//! Platform-agnostic core case-play logic for the Casewalk clinical learning
//! platform. This crate provides the case graph, the play-state engine, and
//! the debrief tooling without UI or platform-specific dependencies.

pub mod achievements;
pub mod constants;
pub mod data;
pub mod engine;
pub mod golden;
pub mod graph;
pub mod numbers;
pub mod policy;
pub mod state;
pub mod summary;

// Re-export commonly used types
pub use achievements::{Achievement, AchievementId, AchievementStatus, evaluate_achievements};
pub use data::{CaseContent, CaseMeta, OptionContent, OptionOutcomes, StageContent, StageType};
pub use engine::{CaseEngine, CaseError, apply_selection, replay_timeline};
pub use golden::{GoldenSegment, golden_path};
pub use graph::{CaseGraph, GraphError};
pub use policy::{AchievementCfg, ComboCfg, EnginePolicy, MasteryCfg, PolicyError};
pub use state::{PlayState, PlayStatus, Step};
pub use summary::{CaseSummary, Grade, case_summary};

/// Trait for abstracting case content loading
/// Platform-specific implementations should provide this
pub trait CaseSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the content for a case by its slug
    ///
    /// # Errors
    ///
    /// Returns an error if the case content cannot be loaded.
    fn load_case(&self, case_slug: &str) -> Result<CaseContent, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting attempt persistence
/// Platform-specific implementations should provide this
pub trait AttemptStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save an attempt's play state
    ///
    /// # Errors
    ///
    /// Returns an error if the play state cannot be saved.
    fn save_attempt(&self, attempt_name: &str, state: &PlayState) -> Result<(), Self::Error>;

    /// Load an attempt's play state
    ///
    /// # Errors
    ///
    /// Returns an error if the play state cannot be loaded.
    fn load_attempt(&self, attempt_name: &str) -> Result<Option<PlayState>, Self::Error>;

    /// Delete a saved attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot be deleted.
    fn delete_attempt(&self, attempt_name: &str) -> Result<(), Self::Error>;
}

/// Main runtime for managing case attempts
pub struct CaseRuntime<L, S>
where
    L: CaseSource,
    S: AttemptStorage,
{
    source: L,
    storage: S,
}

impl<L, S> CaseRuntime<L, S>
where
    L: CaseSource,
    S: AttemptStorage,
{
    /// Create a new runtime with the provided case source and storage
    pub const fn new(source: L, storage: S) -> Self {
        Self { source, storage }
    }

    /// Start a fresh attempt at the named case under the bundled policy
    ///
    /// # Errors
    ///
    /// Returns an error if the case content cannot be loaded.
    pub fn start_case(&self, case_slug: &str) -> Result<CaseEngine, L::Error> {
        self.start_case_with(case_slug, EnginePolicy::load_from_static())
    }

    /// Start a fresh attempt under an explicit tuning policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the case content cannot be loaded.
    pub fn start_case_with(
        &self,
        case_slug: &str,
        policy: EnginePolicy,
    ) -> Result<CaseEngine, L::Error> {
        let content = self.source.load_case(case_slug)?;
        Ok(CaseEngine::from_content(content, policy))
    }

    /// Load a tuning policy override from the case source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    pub fn load_policy(&self, config_name: &str) -> Result<EnginePolicy, L::Error> {
        let mut policy: EnginePolicy = self.source.load_config(config_name)?;
        policy.sanitize();
        Ok(policy)
    }

    /// Save an attempt's play state
    ///
    /// # Errors
    ///
    /// Returns an error if the play state cannot be saved.
    pub fn save_attempt(&self, attempt_name: &str, state: &PlayState) -> Result<(), S::Error> {
        self.storage.save_attempt(attempt_name, state)
    }

    /// Delete a saved attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot be deleted.
    pub fn delete_attempt(&self, attempt_name: &str) -> Result<(), S::Error> {
        self.storage.delete_attempt(attempt_name)
    }

    /// Resume a saved attempt against freshly loaded case content
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot be loaded, or if the case
    /// content no longer builds into a valid graph.
    pub fn resume_case(
        &self,
        case_slug: &str,
        attempt_name: &str,
    ) -> Result<Option<CaseEngine>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        if let Some(state) = self.storage.load_attempt(attempt_name).map_err(Into::into)? {
            // Rehydrate against fresh content
            let content = self.source.load_case(case_slug).map_err(Into::into)?;
            let graph = CaseGraph::build(content)?;
            Ok(Some(CaseEngine::from_state(
                graph,
                EnginePolicy::load_from_static(),
                state,
            )))
        } else {
            Ok(None)
        }
    }
}
