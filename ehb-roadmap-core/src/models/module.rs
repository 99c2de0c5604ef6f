use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::{Priority, Status};

/// A platform module on the roadmap.
///
/// Modules are the top-level units of the EHB platform (wallet, franchise
/// management, affiliate network, ...). Each module owns an ordered list of
/// [`Feature`]s. The order of modules, and of features within a module, is
/// the dataset order that search uses to break score ties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    /// Stable slug, e.g. `ehb-wallet`.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub progress: u8,
    /// Team or person accountable for the module.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A capability delivered as part of a [`Module`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}
