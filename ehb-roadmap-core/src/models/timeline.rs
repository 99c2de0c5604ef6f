use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::{Priority, Status};

/// A dated milestone on the roadmap timeline, e.g. "Phase 2: Expansion".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Ids of the modules this milestone delivers or depends on.
    #[serde(default)]
    pub module_ids: Vec<String>,
}
