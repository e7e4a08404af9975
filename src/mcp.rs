//! MCP server surface built on `rmcp`.
//!
//! Every tool failure is reported as a normal [`CallToolResult`] with
//! `is_error` set; the transport never sees a protocol error for a failed call.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use tracing::{error, info};

use crate::router::ToolRouter;
use crate::tools::{Operation, ToolError};

pub const SERVER_NAME: &str = "n8n-mcp";

/// Convert the outcome of a routed call into the result envelope.
///
/// Success carries the pretty-printed JSON value; failure carries
/// `Error: {message}`.
pub fn into_call_result(outcome: Result<Value, ToolError>) -> CallToolResult {
    match outcome {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            CallToolResult::success(vec![Content::text(text)])
        }
        Err(e) => CallToolResult::error(vec![Content::text(format!("Error: {e}"))]),
    }
}

/// Describe one operation as an MCP tool.
pub fn tool_from(operation: &Operation) -> Tool {
    Tool::new(operation.name, operation.description, operation.shape.schema())
}

/// `rmcp` handler exposing the tool catalog.
#[derive(Clone)]
pub struct N8nServer {
    router: Arc<ToolRouter>,
}

impl N8nServer {
    pub fn new(router: ToolRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.router.catalog().iter().map(tool_from).collect()
    }
}

impl ServerHandler for N8nServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let name: &str = &request.name;
        let args = request.arguments.unwrap_or_default();
        info!(tool = name, "tool call");

        let outcome = self
            .router
            .route_until(name, &args, context.ct.cancelled())
            .await;
        if let Err(e) = &outcome {
            error!(tool = name, error = %e, "tool call failed");
        }

        Ok(into_call_result(outcome))
    }
}
