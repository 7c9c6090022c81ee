//! The tool catalog: names, descriptions, input schemas and dispatch onto [`CopypartyClient`].

use crate::annotations::{Effect, annotations_for};
use crate::config::ServerSettings;
use crate::error::ToolError;
use copyparty_client::CopypartyClient;
use copyparty_client::files::{
    CreateDirectoryArgs, DeleteFileArgs, DeleteMultipleArgs, DownloadFileArgs, FilterFilesArgs,
    ListFilesArgs, TransferArgs, UploadFileArgs,
};
use copyparty_client::info::{PROBE_TIMEOUT, Reachability};
use copyparty_client::media::{ArchiveArgs, RenderArgs, TailArgs, TextArgs, ThumbnailArgs};
use copyparty_client::metadata::FileMetadataArgs;
use copyparty_client::search::{RecentUploadsArgs, SearchFilesArgs};
use copyparty_client::shares::{CreateShareArgs, DeleteShareArgs, UpdateShareArgs};
use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

pub const SERVER_NAME: &str = "copyparty MCP Server";

struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    effect: Effect,
    schema: Value,
}

fn path_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

#[allow(clippy::too_many_lines)]
fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            name: "list_files",
            description: "List files and folders in a directory on the copyparty server.",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": { "type": "string", "default": "/", "description": "Directory to list" },
                    "include_dotfiles": { "type": "boolean", "default": false, "description": "Include hidden dotfiles" },
                    "include_tags": { "type": "boolean", "default": false, "description": "Include media tags (artist, duration, ...)" }
                }),
                &[],
            ),
        },
        CatalogEntry {
            name: "filter_files",
            description: "List a directory, keeping only files whose name contains the pattern (case-insensitive).",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": { "type": "string", "default": "/", "description": "Directory to list" },
                    "pattern": { "type": "string", "description": "Substring to match against file names" }
                }),
                &[],
            ),
        },
        CatalogEntry {
            name: "download_file",
            description: "Download a file. Text is returned as-is; binary content is base64 encoded.",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": path_prop("File to download"),
                    "as_base64": { "type": "boolean", "default": false, "description": "Always return base64" }
                }),
                &["path"],
            ),
        },
        CatalogEntry {
            name: "upload_file",
            description: "Upload a file into a directory on the copyparty server.",
            effect: Effect::Additive,
            schema: object(
                json!({
                    "path": path_prop("Target directory"),
                    "content": { "type": "string", "description": "File content (text, or base64 when is_base64 is set)" },
                    "filename": { "type": "string", "description": "Name of the new file" },
                    "is_base64": { "type": "boolean", "default": false, "description": "content is base64 encoded" },
                    "replace": { "type": "boolean", "default": false, "description": "Overwrite an existing file" }
                }),
                &["path", "content", "filename"],
            ),
        },
        CatalogEntry {
            name: "create_directory",
            description: "Create a new directory.",
            effect: Effect::Additive,
            schema: object(
                json!({
                    "path": path_prop("Parent directory"),
                    "name": { "type": "string", "description": "Name of the new directory" }
                }),
                &["path", "name"],
            ),
        },
        CatalogEntry {
            name: "delete_file",
            description: "Delete a file or directory.",
            effect: Effect::Destructive,
            schema: object(json!({ "path": path_prop("File or directory to delete") }), &["path"]),
        },
        CatalogEntry {
            name: "move_file",
            description: "Move or rename a file or directory.",
            effect: Effect::Destructive,
            schema: object(
                json!({
                    "source_path": path_prop("Current path"),
                    "destination_path": path_prop("New path")
                }),
                &["source_path", "destination_path"],
            ),
        },
        CatalogEntry {
            name: "copy_file",
            description: "Copy a file or directory.",
            effect: Effect::Additive,
            schema: object(
                json!({
                    "source_path": path_prop("Path to copy"),
                    "destination_path": path_prop("Path of the copy")
                }),
                &["source_path", "destination_path"],
            ),
        },
        CatalogEntry {
            name: "delete_multiple_files",
            description: "Delete several files or directories in one request.",
            effect: Effect::Destructive,
            schema: object(
                json!({
                    "paths": { "type": "array", "items": { "type": "string" }, "description": "Paths to delete" }
                }),
                &["paths"],
            ),
        },
        CatalogEntry {
            name: "get_recent_uploads",
            description: "Show recent uploads, either this client's own or (admin) everyone's.",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "filter_path": { "type": "string", "description": "Only uploads below this path" },
                    "all_uploads": { "type": "boolean", "default": false, "description": "Everyone's uploads (admin only)" },
                    "as_json": { "type": "boolean", "default": false, "description": "Ask the server for JSON" }
                }),
                &[],
            ),
        },
        CatalogEntry {
            name: "search_files",
            description: "Search the server's file index, e.g. \"name like *.flac and size > 1024\".",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "query": { "type": "string", "description": "copyparty search expression" },
                    "path": { "type": "string", "default": "/", "description": "Volume to search in" }
                }),
                &["query"],
            ),
        },
        CatalogEntry {
            name: "get_file_metadata",
            description: "Size, modification time and media tags of one file or directory.",
            effect: Effect::ReadOnly,
            schema: object(json!({ "path": path_prop("File or directory") }), &["path"]),
        },
        CatalogEntry {
            name: "create_share",
            description: "Create a share link for a file or directory.",
            effect: Effect::Additive,
            schema: object(
                json!({
                    "path": path_prop("Path to share"),
                    "key": { "type": "string", "description": "Share key; random when omitted" },
                    "password": { "type": "string", "description": "Password protecting the share" },
                    "expire_minutes": { "type": "integer", "minimum": 0, "description": "Minutes until expiry; 0 never expires" },
                    "read_only": { "type": "boolean", "default": true, "description": "Read-only share" }
                }),
                &["path"],
            ),
        },
        CatalogEntry {
            name: "list_shares",
            description: "List existing shares.",
            effect: Effect::ReadOnly,
            schema: object(json!({}), &[]),
        },
        CatalogEntry {
            name: "update_share",
            description: "Change a share's expiry.",
            effect: Effect::Destructive,
            schema: object(
                json!({
                    "key": { "type": "string", "description": "Share key" },
                    "expire_minutes": { "type": "integer", "minimum": 0, "description": "New expiry in minutes from now" }
                }),
                &["key", "expire_minutes"],
            ),
        },
        CatalogEntry {
            name: "delete_share",
            description: "Remove a share.",
            effect: Effect::Destructive,
            schema: object(
                json!({ "key": { "type": "string", "description": "Share key" } }),
                &["key"],
            ),
        },
        CatalogEntry {
            name: "download_archive",
            description: "Download a directory as a tar or zip archive (base64).",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": path_prop("Directory to archive"),
                    "format": { "type": "string", "enum": ["tar", "zip"] },
                    "codec": { "type": "string", "description": "tar: gz, bz2, xz, pax; zip: utf8, crc, dos" },
                    "level": { "type": "integer", "minimum": 0, "description": "Compression level (compressed tar only)" }
                }),
                &["path", "format"],
            ),
        },
        CatalogEntry {
            name: "tail_file",
            description: "Read the end of a file, following it for a few seconds if it is still growing.",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": path_prop("File to tail"),
                    "offset": { "type": "integer", "default": -4096, "description": "Start offset; negative counts from the end" },
                    "wait_seconds": { "type": "integer", "minimum": 0, "default": 3, "description": "How long to follow the file" }
                }),
                &["path"],
            ),
        },
        CatalogEntry {
            name: "get_file_text",
            description: "Fetch a file as plain text, optionally transcoded to a charset.",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": path_prop("File to read"),
                    "charset": { "type": "string", "description": "Target character set" }
                }),
                &["path"],
            ),
        },
        CatalogEntry {
            name: "render_file",
            description: "Fetch the server-rendered view of a document, e.g. markdown as HTML.",
            effect: Effect::ReadOnly,
            schema: object(json!({ "path": path_prop("Document to render") }), &["path"]),
        },
        CatalogEntry {
            name: "get_thumbnail",
            description: "Fetch a thumbnail of an image, video or audio file (base64).",
            effect: Effect::ReadOnly,
            schema: object(
                json!({
                    "path": path_prop("Media file"),
                    "format": { "type": "string", "description": "Thumbnail format code, e.g. w (webp) or j (jpeg)" }
                }),
                &["path"],
            ),
        },
        CatalogEntry {
            name: "get_server_info",
            description: "Report this MCP server's configuration and whether copyparty is reachable.",
            effect: Effect::ReadOnly,
            schema: object(json!({}), &[]),
        },
    ]
}

/// Build the MCP tool list advertised by `tools/list`.
#[must_use]
pub fn tool_list() -> Vec<Tool> {
    catalog()
        .into_iter()
        .map(|entry| {
            let schema: JsonObject = match entry.schema {
                Value::Object(map) => map,
                _ => JsonObject::new(),
            };
            let mut tool = Tool::new(entry.name, entry.description, Arc::new(schema));
            tool.annotations = Some(annotations_for(entry.effect));
            tool
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfoReport {
    pub mcp_server_name: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub copyparty_url: String,
    pub copyparty_status: String,
    pub copyparty_accessible: bool,
    pub authentication_configured: bool,
}

async fn server_info(client: &CopypartyClient, settings: &ServerSettings) -> ServerInfoReport {
    let Reachability {
        accessible, status, ..
    } = client.probe(PROBE_TIMEOUT).await;
    ServerInfoReport {
        mcp_server_name: SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
        environment: settings.environment.clone(),
        copyparty_url: client.config().base_url().to_string(),
        copyparty_status: status,
        copyparty_accessible: accessible,
        authentication_configured: client.config().auth_configured(),
    }
}

/// Arguments of tools that take none; unknown keys are still rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

fn args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn to_json<T: Serialize>(result: T) -> Result<Value, ToolError> {
    serde_json::to_value(result).map_err(ToolError::Serialize)
}

/// Run one tool by name.
///
/// # Errors
///
/// Returns [`ToolError::UnknownTool`] for names outside the catalog,
/// [`ToolError::InvalidArguments`] when `arguments` do not fit the tool, and
/// [`ToolError::Copyparty`] when the remote call fails.
pub async fn call(
    client: &CopypartyClient,
    settings: &ServerSettings,
    name: &str,
    arguments: Value,
) -> Result<Value, ToolError> {
    tracing::debug!(tool = name, "tool call");
    match name {
        "list_files" => {
            let a: ListFilesArgs = args(name, arguments)?;
            to_json(client.list_files(&a).await?)
        }
        "filter_files" => {
            let a: FilterFilesArgs = args(name, arguments)?;
            to_json(client.filter_files(&a).await?)
        }
        "download_file" => {
            let a: DownloadFileArgs = args(name, arguments)?;
            to_json(client.download_file(&a).await?)
        }
        "upload_file" => {
            let a: UploadFileArgs = args(name, arguments)?;
            to_json(client.upload_file(&a).await?)
        }
        "create_directory" => {
            let a: CreateDirectoryArgs = args(name, arguments)?;
            to_json(client.create_directory(&a).await?)
        }
        "delete_file" => {
            let a: DeleteFileArgs = args(name, arguments)?;
            to_json(client.delete_file(&a).await?)
        }
        "move_file" => {
            let a: TransferArgs = args(name, arguments)?;
            to_json(client.move_file(&a).await?)
        }
        "copy_file" => {
            let a: TransferArgs = args(name, arguments)?;
            to_json(client.copy_file(&a).await?)
        }
        "delete_multiple_files" => {
            let a: DeleteMultipleArgs = args(name, arguments)?;
            to_json(client.delete_multiple_files(&a).await?)
        }
        "get_recent_uploads" => {
            let a: RecentUploadsArgs = args(name, arguments)?;
            to_json(client.get_recent_uploads(&a).await?)
        }
        "search_files" => {
            let a: SearchFilesArgs = args(name, arguments)?;
            to_json(client.search_files(&a).await?)
        }
        "get_file_metadata" => {
            let a: FileMetadataArgs = args(name, arguments)?;
            to_json(client.get_file_metadata(&a).await?)
        }
        "create_share" => {
            let a: CreateShareArgs = args(name, arguments)?;
            to_json(client.create_share(&a).await?)
        }
        "list_shares" => {
            let NoArgs {} = args(name, arguments)?;
            to_json(client.list_shares().await?)
        }
        "update_share" => {
            let a: UpdateShareArgs = args(name, arguments)?;
            to_json(client.update_share(&a).await?)
        }
        "delete_share" => {
            let a: DeleteShareArgs = args(name, arguments)?;
            to_json(client.delete_share(&a).await?)
        }
        "download_archive" => {
            let a: ArchiveArgs = args(name, arguments)?;
            to_json(client.download_archive(&a).await?)
        }
        "tail_file" => {
            let a: TailArgs = args(name, arguments)?;
            to_json(client.tail_file(&a).await?)
        }
        "get_file_text" => {
            let a: TextArgs = args(name, arguments)?;
            to_json(client.get_file_text(&a).await?)
        }
        "render_file" => {
            let a: RenderArgs = args(name, arguments)?;
            to_json(client.render_file(&a).await?)
        }
        "get_thumbnail" => {
            let a: ThumbnailArgs = args(name, arguments)?;
            to_json(client.get_thumbnail(&a).await?)
        }
        "get_server_info" => {
            let NoArgs {} = args(name, arguments)?;
            to_json(server_info(client, settings).await)
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}
