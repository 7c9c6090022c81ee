//! MCP server handler.

use crate::config::ServerSettings;
use crate::tools::{self, SERVER_NAME};
use copyparty_client::CopypartyClient;
use rmcp::ErrorData;
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::Value;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Tools for a copyparty file server: browse, search, transfer and \
share files. Paths are absolute volume paths such as /music/album/track.flac.";

/// One handler per MCP session; all sessions share the client and the tool list.
#[derive(Clone)]
pub struct CopypartyMcp {
    client: CopypartyClient,
    settings: Arc<ServerSettings>,
    tools: Arc<Vec<Tool>>,
}

impl CopypartyMcp {
    #[must_use]
    pub fn new(client: CopypartyClient, settings: ServerSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
            tools: Arc::new(tools::tool_list()),
        }
    }
}

fn success_result(value: Value) -> CallToolResult {
    let text = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    // structuredContent must be an object; raw listings and arrays stay text-only.
    let structured_content = value.is_object().then_some(value);
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content,
        is_error: Some(false),
        meta: None,
    }
}

impl ServerHandler for CopypartyMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tools.as_ref().clone(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let name = request.name.as_ref();
        let arguments = Value::Object(request.arguments.unwrap_or_default());

        match tools::call(&self.client, &self.settings, name, arguments).await {
            Ok(value) => Ok(success_result(value)),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                e.into_call_result()
            }
        }
    }
}
