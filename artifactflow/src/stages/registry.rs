//! Lookup from stage name to implementation.

use super::Stage;
use crate::core::StageName;
use crate::errors::ArtifactflowError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Stages every completed free-form run reaches.
///
/// The structured-source stages and template selection are resolved
/// lazily; a missing one fails only the runs that need it.
pub const REQUIRED_STAGES: [StageName; 8] = [
    StageName::SpecificationExtraction,
    StageName::AudienceProfiling,
    StageName::ExampleGeneration,
    StageName::CopyGeneration,
    StageName::ArtifactBuilding,
    StageName::ComplianceAuditing,
    StageName::QualityGrading,
    StageName::FeedbackRevision,
];

/// An immutable registry of stage implementations.
///
/// Safe to share across concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: BTreeMap<StageName, Arc<dyn Stage>>,
}

impl StageRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder::default()
    }

    /// Resolves a stage.
    ///
    /// A missing stage is a configuration error and is never retried.
    pub fn get(&self, name: StageName) -> Result<Arc<dyn Stage>, ArtifactflowError> {
        self.stages
            .get(&name)
            .cloned()
            .ok_or(ArtifactflowError::UnknownStage(name))
    }

    /// Returns true if a stage is registered.
    #[must_use]
    pub fn contains(&self, name: StageName) -> bool {
        self.stages.contains_key(&name)
    }

    /// Returns the registered stage names in control-flow order.
    #[must_use]
    pub fn names(&self) -> Vec<StageName> {
        self.stages.keys().copied().collect()
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Lists the [`REQUIRED_STAGES`] the registry lacks.
    #[must_use]
    pub fn missing_required(&self) -> Vec<StageName> {
        REQUIRED_STAGES
            .iter()
            .copied()
            .filter(|name| !self.contains(*name))
            .collect()
    }
}

/// Builder for [`StageRegistry`].
#[derive(Debug, Default)]
pub struct StageRegistryBuilder {
    stages: BTreeMap<StageName, Arc<dyn Stage>>,
}

impl StageRegistryBuilder {
    /// Registers a stage under its own name, replacing any earlier one.
    #[must_use]
    pub fn register(self, stage: impl Stage + 'static) -> Self {
        self.register_arc(Arc::new(stage))
    }

    /// Registers a shared stage under its own name.
    #[must_use]
    pub fn register_arc(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.insert(stage.name(), stage);
        self
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> StageRegistry {
        StageRegistry {
            stages: self.stages,
        }
    }
}
