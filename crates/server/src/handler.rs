//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::audit::{SiteAuditParams, audit_impl};
use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use sitebrief_client::AuditPipeline;
use sitebrief_core::CacheDb;

/// The main MCP server handler for sitebrief.
#[derive(Clone)]
pub struct SitebriefServer {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<AuditPipeline>,
    cache: CacheDb,
}

#[tool_router]
impl SitebriefServer {
    /// Create a new server handler around a wired pipeline and the cache it writes to.
    pub fn new(pipeline: AuditPipeline, cache: CacheDb) -> Self {
        Self { tool_router: Self::tool_router(), pipeline: Arc::new(pipeline), cache }
    }

    #[tool(
        description = "Audit a website: measures mobile and desktop performance, scrapes the home, about, contact and services pages, and returns a strategic document or website-builder prompt."
    )]
    async fn site_audit(&self, params: Parameters<SiteAuditParams>) -> Result<CallToolResult, McpError> {
        audit_impl(&self.pipeline, params.0).await
    }

    #[tool(description = "Read a fresh cached performance report (mobile, desktop) or scraped page (home, about, contact, services) for a site.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.cache, params.0).await
    }

    #[tool(description = "Purge expired cache entries and/or every entry cached for one site. Returns the number deleted.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.cache, params.0).await
    }
}

impl ServerHandler for SitebriefServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sitebrief".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Call site_audit with a URL to get a performance and content brief. cache_get and cache_purge manage cached inputs."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
