use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::module::{Feature, Module};
use super::status::{Priority, Status};
use super::timeline::TimelineEvent;

/// Which kind of roadmap record a search hit refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Module,
    Feature,
    Timeline,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Feature => "feature",
            Self::Timeline => "timeline",
        }
    }
}

/// A module, feature or timeline event as seen by search.
///
/// Serialized without a tag: the kind travels next to it (see
/// `SearchResult::kind`), so reading one back goes through [`Self::from_value`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SearchableRecord {
    Module(Module),
    Timeline(TimelineEvent),
    Feature(Feature),
}

impl SearchableRecord {
    /// Decode an untagged record of the given kind.
    pub fn from_value(kind: RecordKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            RecordKind::Module => Self::Module(serde_json::from_value(value)?),
            RecordKind::Feature => Self::Feature(serde_json::from_value(value)?),
            RecordKind::Timeline => Self::Timeline(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Module(_) => RecordKind::Module,
            Self::Feature(_) => RecordKind::Feature,
            Self::Timeline(_) => RecordKind::Timeline,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Module(m) => &m.id,
            Self::Feature(f) => &f.id,
            Self::Timeline(t) => &t.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Module(m) => &m.title,
            Self::Feature(f) => &f.title,
            Self::Timeline(t) => &t.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Module(m) => m.description.as_deref(),
            Self::Feature(f) => f.description.as_deref(),
            Self::Timeline(t) => t.description.as_deref(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Module(m) => m.status,
            Self::Feature(f) => f.status,
            Self::Timeline(t) => t.status,
        }
    }

    pub fn priority(&self) -> Option<Priority> {
        match self {
            Self::Module(m) => m.priority,
            Self::Feature(f) => f.priority,
            Self::Timeline(t) => t.priority,
        }
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        match self {
            Self::Module(m) => &m.tags,
            Self::Feature(f) => &f.tags,
            Self::Timeline(t) => &t.tags,
        }
    }
}

impl From<Module> for SearchableRecord {
    fn from(module: Module) -> Self {
        Self::Module(module)
    }
}

impl From<Feature> for SearchableRecord {
    fn from(feature: Feature) -> Self {
        Self::Feature(feature)
    }
}

impl From<TimelineEvent> for SearchableRecord {
    fn from(event: TimelineEvent) -> Self {
        Self::Timeline(event)
    }
}
