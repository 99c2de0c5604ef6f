use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::module::Module;
use super::timeline::TimelineEvent;

/// The roadmap snapshot that search runs over.
///
/// A dataset is seeded once (from [`crate::seed::default_dataset`] or an
/// imported JSON file) and then only read. Export and import go through
/// [`Dataset::to_json`] and [`Dataset::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

/// Reasons an imported dataset is rejected.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Malformed dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate module id '{0}'")]
    DuplicateModule(String),

    #[error("Duplicate feature id '{0}'")]
    DuplicateFeature(String),

    #[error("Duplicate timeline event id '{0}'")]
    DuplicateEvent(String),

    #[error("Module '{id}' has progress {progress}, must be at most 100")]
    InvalidProgress { id: String, progress: u8 },
}

impl Dataset {
    /// Parse and validate a dataset export.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn to_json(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check id uniqueness per record kind and progress bounds.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut module_ids = HashSet::new();
        let mut feature_ids = HashSet::new();

        for module in &self.modules {
            if !module_ids.insert(module.id.as_str()) {
                return Err(DatasetError::DuplicateModule(module.id.clone()));
            }
            if module.progress > 100 {
                return Err(DatasetError::InvalidProgress {
                    id: module.id.clone(),
                    progress: module.progress,
                });
            }
            for feature in &module.features {
                if !feature_ids.insert(feature.id.as_str()) {
                    return Err(DatasetError::DuplicateFeature(feature.id.clone()));
                }
            }
        }

        let mut event_ids = HashSet::new();
        for event in &self.timeline {
            if !event_ids.insert(event.id.as_str()) {
                return Err(DatasetError::DuplicateEvent(event.id.clone()));
            }
        }

        Ok(())
    }

    /// Number of searchable records (modules, features and events).
    pub fn record_count(&self) -> usize {
        self.modules.len()
            + self.modules.iter().map(|m| m.features.len()).sum::<usize>()
            + self.timeline.len()
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }
}
