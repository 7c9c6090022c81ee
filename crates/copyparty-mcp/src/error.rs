//! Error types for tool calls.

use copyparty_client::CopypartyError;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool with this name in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's schema.
    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    /// The copyparty call failed (remote status, transport, or unusable argument values).
    #[error(transparent)]
    Copyparty(#[from] CopypartyError),

    /// A result record could not be serialized.
    #[error("Failed to serialize tool result: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ToolError {
    /// Map to what the MCP caller sees.
    ///
    /// Caller mistakes (unknown tool, malformed arguments) are protocol errors. Failures of the
    /// operation itself are tool results with `isError: true`, so the model can read them.
    pub fn into_call_result(self) -> Result<CallToolResult, ErrorData> {
        match self {
            Self::UnknownTool(_) | Self::InvalidArguments { .. } => {
                Err(ErrorData::invalid_params(self.to_string(), None))
            }
            Self::Serialize(_) => Err(ErrorData::internal_error(self.to_string(), None)),
            Self::Copyparty(e) => {
                let payload = error_payload(&e);
                let text = serde_json::to_string(&payload).unwrap_or_else(|_| e.to_string());
                Ok(CallToolResult {
                    content: vec![Content::text(text)],
                    structured_content: Some(payload),
                    is_error: Some(true),
                    meta: None,
                })
            }
        }
    }
}

fn error_payload(e: &CopypartyError) -> Value {
    let message = e.to_string();
    let detail = match e {
        CopypartyError::Remote { status, body } => json!({
            "kind": "remote_request",
            "status": status,
            "body": body,
            "message": message,
        }),
        CopypartyError::Transport(_) => json!({ "kind": "transport", "message": message }),
        CopypartyError::InvalidArgument(_) => {
            json!({ "kind": "invalid_argument", "message": message })
        }
        CopypartyError::Config(_) => json!({ "kind": "config", "message": message }),
    };
    json!({ "error": detail })
}
