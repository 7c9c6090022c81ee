//! Listing, transfer and file management operations.

use crate::body::{Body, FilePayload};
use crate::error::{CopypartyError, Result};
use crate::http::{CopypartyClient, Query};
use base64::Engine as _;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) fn root_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListFilesArgs {
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default)]
    pub include_dotfiles: bool,
    #[serde(default)]
    pub include_tags: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterFilesArgs {
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadFileArgs {
    pub path: String,
    #[serde(default)]
    pub as_base64: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadFileArgs {
    /// Target directory.
    pub path: String,
    pub content: String,
    pub filename: String,
    #[serde(default)]
    pub is_base64: bool,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDirectoryArgs {
    /// Parent directory.
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteFileArgs {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferArgs {
    pub source_path: String,
    pub destination_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteMultipleArgs {
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryCreated {
    pub success: bool,
    pub path: String,
    pub directory: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathDeleted {
    pub success: bool,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathTransferred {
    pub success: bool,
    pub source: String,
    pub destination: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathsDeleted {
    pub success: bool,
    pub count: usize,
    pub paths: Vec<String>,
}

impl CopypartyClient {
    /// List a directory (`?ls`).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn list_files(&self, args: &ListFilesArgs) -> Result<Body> {
        let query = Query::new()
            .flag("ls")
            .flag_if(args.include_dotfiles, "dots")
            .flag_if(args.include_tags, "tags");
        let req = self.request(Method::GET, &args.path, &query)?;
        let resp = self.send(req).await?;
        Ok(Body::parse(&resp.bytes))
    }

    /// List a directory and keep only files whose name contains `pattern` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn filter_files(&self, args: &FilterFilesArgs) -> Result<Body> {
        let req = self.request(Method::GET, &args.path, &Query::new().flag("ls"))?;
        let resp = self.send(req).await?;
        let mut body = Body::parse(&resp.bytes);

        if let (Some(pattern), Body::Json(Value::Object(listing))) =
            (args.pattern.as_deref(), &mut body)
            && let Some(Value::Array(files)) = listing.get_mut("files")
        {
            let needle = pattern.to_lowercase();
            files.retain(|f| {
                crate::metadata::entry_name(f).is_some_and(|n| n.to_lowercase().contains(&needle))
            });
            listing.insert("filtered".to_string(), Value::Bool(true));
            listing.insert("pattern".to_string(), Value::String(pattern.to_string()));
        }

        Ok(body)
    }

    /// Download a file as text, or base64 when requested or when it is not UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn download_file(&self, args: &DownloadFileArgs) -> Result<FilePayload> {
        let req = self.request(Method::GET, &args.path, &Query::new())?;
        let resp = self.send(req).await?;
        Ok(FilePayload::new(
            &args.path,
            resp.content_type_or_default(),
            &resp.bytes,
            args.as_base64,
        ))
    }

    /// Upload one file into a directory (multipart `bput`).
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is flagged as base64 but does not decode, on transport
    /// failure, or on a non-2xx response.
    pub async fn upload_file(&self, args: &UploadFileArgs) -> Result<Body> {
        let data = if args.is_base64 {
            base64::engine::general_purpose::STANDARD
                .decode(args.content.trim())
                .map_err(|e| {
                    CopypartyError::InvalidArgument(format!("content is not valid base64: {e}"))
                })?
        } else {
            args.content.clone().into_bytes()
        };

        let form = Form::new()
            .text("act", "bput")
            .part("f", Part::bytes(data).file_name(args.filename.clone()));
        let query = Query::new().flag("j").flag_if(args.replace, "replace");
        let req = self
            .request(Method::POST, &args.path, &query)?
            .multipart(form);
        let resp = self.send(req).await?;
        Ok(Body::parse(&resp.bytes))
    }

    /// Create a subdirectory `name` under `path`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn create_directory(&self, args: &CreateDirectoryArgs) -> Result<DirectoryCreated> {
        let req = self
            .request(Method::POST, &args.path, &Query::new())?
            .form(&[("act", "mkdir"), ("name", args.name.as_str())]);
        self.send(req).await?;
        Ok(DirectoryCreated {
            success: true,
            path: args.path.clone(),
            directory: args.name.clone(),
            message: format!(
                "Directory '{}' created successfully at {}",
                args.name, args.path
            ),
        })
    }

    /// Delete a file, or a directory recursively.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn delete_file(&self, args: &DeleteFileArgs) -> Result<PathDeleted> {
        let req = self.request(Method::POST, &args.path, &Query::new().flag("delete"))?;
        self.send(req).await?;
        Ok(PathDeleted {
            success: true,
            path: args.path.clone(),
            message: format!("Successfully deleted {}", args.path),
        })
    }

    /// Move or rename a file or directory.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn move_file(&self, args: &TransferArgs) -> Result<PathTransferred> {
        self.transfer(args, "move", "moved").await
    }

    /// Copy a file or directory.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn copy_file(&self, args: &TransferArgs) -> Result<PathTransferred> {
        self.transfer(args, "copy", "copied").await
    }

    async fn transfer(&self, args: &TransferArgs, op: &str, verb: &str) -> Result<PathTransferred> {
        let query = Query::new().pair(op, args.destination_path.as_str());
        let req = self.request(Method::POST, &args.source_path, &query)?;
        self.send(req).await?;
        Ok(PathTransferred {
            success: true,
            source: args.source_path.clone(),
            destination: args.destination_path.clone(),
            message: format!(
                "Successfully {verb} {} to {}",
                args.source_path, args.destination_path
            ),
        })
    }

    /// Delete several paths in one request; the body is the JSON list of paths.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn delete_multiple_files(&self, args: &DeleteMultipleArgs) -> Result<PathsDeleted> {
        let req = self
            .request(Method::POST, "/", &Query::new().flag("delete"))?
            .json(&args.paths);
        self.send(req).await?;
        Ok(PathsDeleted {
            success: true,
            count: args.paths.len(),
            paths: args.paths.clone(),
        })
    }
}
