//! MCP server exposing roadmap search to AI tools.

mod tree_render;
mod types;

use std::str::FromStr;

pub use tree_render::render_roadmap;
pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;

use crate::db::Database;
use crate::models::*;
use crate::search::SearchFilters;

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_status(s: &str) -> Result<Status, McpError> {
        Status::from_str(s).map_err(|_| {
            McpError::invalid_params(
                format!(
                    "Invalid status '{}'. Must be: planned, in-progress, completed, or on-hold",
                    s
                ),
                None,
            )
        })
    }

    fn parse_priority(s: &str) -> Result<Priority, McpError> {
        Priority::from_str(s).map_err(|_| {
            McpError::invalid_params(
                format!(
                    "Invalid priority '{}'. Must be: low, medium, high, or critical",
                    s
                ),
                None,
            )
        })
    }

    fn internal(e: impl std::fmt::Display) -> McpError {
        McpError::internal_error(e.to_string(), None)
    }

    fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value).map_err(Self::internal)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // ============================================================
    // Tool logic, shared by the tools and exposed for tests
    // ============================================================

    pub fn test_search(
        &self,
        query: &str,
        status: Option<&str>,
        priority: Option<&str>,
        tags: &[&str],
    ) -> Result<SearchRoadmapResponse, McpError> {
        let filters = SearchFilters {
            status: status.map(Self::parse_status).transpose()?,
            priority: priority.map(Self::parse_priority).transpose()?,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            date_range: None,
        };

        let results = self.db.search(query, &filters).map_err(Self::internal)?;

        Ok(SearchRoadmapResponse {
            query: query.to_string(),
            hits: results.into_iter().map(SearchHitInfo::from).collect(),
        })
    }

    pub fn test_list_modules(&self, status: Option<&str>) -> Result<ModuleListResponse, McpError> {
        let status = status.map(Self::parse_status).transpose()?;
        let modules = self.db.list_modules().map_err(Self::internal)?;

        Ok(ModuleListResponse {
            modules: modules
                .iter()
                .filter(|m| status.map_or(true, |s| m.status == s))
                .map(ModuleSummaryInfo::from)
                .collect(),
        })
    }

    pub fn test_get_module(&self, module_id: &str) -> Result<ModuleInfo, McpError> {
        self.db
            .get_module(module_id)
            .map_err(Self::internal)?
            .map(ModuleInfo::from)
            .ok_or_else(|| McpError::invalid_params("Module not found", None))
    }

    pub fn test_list_timeline(&self, status: Option<&str>) -> Result<TimelineListResponse, McpError> {
        let status = status.map(Self::parse_status).transpose()?;
        let events = self.db.list_timeline().map_err(Self::internal)?;

        Ok(TimelineListResponse {
            events: events
                .into_iter()
                .filter(|e| status.map_or(true, |s| e.status == s))
                .map(TimelineEventInfo::from)
                .collect(),
        })
    }

    pub fn test_render_tree(&self, module_id: Option<&str>) -> Result<String, McpError> {
        let modules = match module_id {
            Some(id) => vec![self
                .db
                .get_module(id)
                .map_err(Self::internal)?
                .ok_or_else(|| McpError::invalid_params("Module not found", None))?],
            None => self.db.list_modules().map_err(Self::internal)?,
        };
        Ok(render_roadmap(&modules))
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        description = "Search the EHB roadmap. Fuzzy-matches the query against module, feature and timeline titles and descriptions and returns up to 20 hits ranked by relevance. Status, priority and tags only boost matching records; they never exclude others. Use get_module for full module details."
    )]
    async fn search_roadmap(
        &self,
        params: Parameters<SearchRoadmapRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let tags: Vec<&str> = req.tags.iter().map(String::as_str).collect();
        let response = self.test_search(
            &req.query,
            req.status.as_deref(),
            req.priority.as_deref(),
            &tags,
        )?;
        Self::json_result(&response)
    }

    #[tool(
        description = "List roadmap modules with status, priority, progress and feature count. Optionally filter by status."
    )]
    async fn list_modules(
        &self,
        params: Parameters<ListModulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.test_list_modules(params.0.status.as_deref())?;
        Self::json_result(&response)
    }

    #[tool(
        description = "Get a module by id with its description, owner, tags and nested features."
    )]
    async fn get_module(
        &self,
        params: Parameters<GetModuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.test_get_module(&params.0.module_id)?;
        Self::json_result(&response)
    }

    #[tool(
        description = "List roadmap timeline milestones in order, with dates and related module ids. Optionally filter by status."
    )]
    async fn list_timeline(
        &self,
        params: Parameters<ListTimelineRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.test_list_timeline(params.0.status.as_deref())?;
        Self::json_result(&response)
    }

    #[tool(
        description = "Render the roadmap as an ASCII tree of modules and features with status symbols (◇ planned, ○ in progress, ● completed, ✗ on hold)."
    )]
    async fn render_roadmap_tree(
        &self,
        params: Parameters<RenderRoadmapTreeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let rendered = self.test_render_tree(params.0.module_id.as_deref())?;
        Ok(CallToolResult::success(vec![Content::text(rendered)]))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "ehb-roadmap".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"EHB Roadmap describes the EHB business platform: its modules (wallet, franchise management, affiliate network, e-learning, content moderation, SQL verification levels), the features inside each module, and the dated timeline milestones.

DISCOVERY:
- search_roadmap: Find modules, features or milestones by free text. Start here.
- list_modules / get_module: Browse modules and read one in full.
- list_timeline: See milestones in date order.
- render_roadmap_tree: Get a quick visual overview.

SEARCH NOTES:
- Matching is fuzzy: small typos still match.
- status, priority and tags raise the score of records that match them but do not hide other records.
- Results below relevance 0.6 are dropped; at most 20 hits are returned."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
