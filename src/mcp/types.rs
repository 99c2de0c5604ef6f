//! Request and response types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Module, TimelineEvent};
use crate::search::SearchResult;

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchRoadmapRequest {
    #[schemars(description = "Free-text query matched fuzzily against titles and descriptions")]
    pub query: String,
    #[schemars(
        description = "Optional status bonus: 'planned', 'in-progress', 'completed' or 'on-hold'. Boosts matching records, does not exclude others."
    )]
    #[serde(default)]
    pub status: Option<String>,
    #[schemars(
        description = "Optional priority bonus: 'low', 'medium', 'high' or 'critical'. Boosts matching records, does not exclude others."
    )]
    #[serde(default)]
    pub priority: Option<String>,
    #[schemars(description = "Optional tags; records sharing more of them rank higher")]
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListModulesRequest {
    #[schemars(description = "Only list modules with this status")]
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetModuleRequest {
    #[schemars(description = "The module id (slug), e.g. 'ehb-wallet'")]
    pub module_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTimelineRequest {
    #[schemars(description = "Only list timeline events with this status")]
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenderRoadmapTreeRequest {
    #[schemars(description = "Render only this module. Omit to render the whole roadmap.")]
    #[serde(default)]
    pub module_id: Option<String>,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchRoadmapResponse {
    pub query: String,
    pub hits: Vec<SearchHitInfo>,
}

/// A search hit trimmed to what an agent needs to decide what to open next.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchHitInfo {
    /// `module`, `feature` or `timeline`
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: String,
    pub status: String,
    pub score: f64,
    pub matches: Vec<String>,
}

impl From<SearchResult> for SearchHitInfo {
    fn from(result: SearchResult) -> Self {
        Self {
            kind: result.kind.as_str().to_string(),
            id: result.item.id().to_string(),
            title: result.item.title().to_string(),
            status: result.item.status().as_str().to_string(),
            score: result.score,
            matches: result.matches,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModuleSummaryInfo {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: Option<String>,
    pub progress: u8,
    pub feature_count: usize,
}

impl From<&Module> for ModuleSummaryInfo {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id.clone(),
            title: module.title.clone(),
            status: module.status.as_str().to_string(),
            priority: module.priority.map(|p| p.as_str().to_string()),
            progress: module.progress,
            feature_count: module.features.len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModuleListResponse {
    pub modules: Vec<ModuleSummaryInfo>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModuleInfo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub progress: u8,
    pub owner: Option<String>,
    pub features: Vec<FeatureInfo>,
}

impl From<Module> for ModuleInfo {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            title: module.title,
            description: module.description,
            status: module.status.as_str().to_string(),
            priority: module.priority.map(|p| p.as_str().to_string()),
            tags: module.tags.into_iter().collect(),
            progress: module.progress,
            owner: module.owner,
            features: module
                .features
                .into_iter()
                .map(|f| FeatureInfo {
                    id: f.id,
                    title: f.title,
                    description: f.description,
                    status: f.status.as_str().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FeatureInfo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEventInfo {
    pub id: String,
    pub title: String,
    pub date: String,
    pub status: String,
    pub module_ids: Vec<String>,
}

impl From<TimelineEvent> for TimelineEventInfo {
    fn from(event: TimelineEvent) -> Self {
        Self {
            id: event.id,
            title: event.title,
            date: event.date.to_string(),
            status: event.status.as_str().to_string(),
            module_ids: event.module_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TimelineListResponse {
    pub events: Vec<TimelineEventInfo>,
}
