//! Per-file metadata lookup.
//!
//! copyparty has no single-file stat endpoint; the metadata (size, mtime, media tags) comes from
//! the parent directory's listing.

use crate::body::Body;
use crate::error::Result;
use crate::http::{CopypartyClient, Query};
use percent_encoding::percent_decode_str;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileMetadataArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataFound {
    pub success: bool,
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Value>,
    pub tags: Value,
    pub entry: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataMissing {
    pub success: bool,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileMetadata {
    Found(MetadataFound),
    Missing(MetadataMissing),
}

impl CopypartyClient {
    /// Look up one entry's metadata in its parent directory listing.
    ///
    /// An entry that is not in the listing is reported as `success: false`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the listing request itself fails.
    pub async fn get_file_metadata(&self, args: &FileMetadataArgs) -> Result<FileMetadata> {
        let (parent, name) = split_parent(&args.path);
        let query = Query::new().flag("ls").flag("tags");
        let req = self.request(Method::GET, &parent, &query)?;
        let resp = self.send(req).await?;

        let body = Body::parse(&resp.bytes);
        let found = match &body {
            Body::Json(Value::Object(listing)) => find_entry(listing, &name),
            _ => None,
        };

        Ok(match found {
            Some((entry, is_dir)) => FileMetadata::Found(MetadataFound {
                success: true,
                path: args.path.clone(),
                name,
                is_dir,
                size: entry.get("sz").cloned(),
                modified: entry.get("ts").cloned(),
                tags: entry
                    .get("tags")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
                entry: entry.clone(),
            }),
            None => FileMetadata::Missing(MetadataMissing {
                success: false,
                path: args.path.clone(),
                message: format!("'{name}' not found in {parent}"),
            }),
        })
    }
}

/// Split `/a/b/c.txt` into (`/a/b/`, `c.txt`). Trailing slashes are ignored.
fn split_parent(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((dir, name)) => (format!("{dir}/"), name.to_string()),
        None => ("/".to_string(), trimmed.to_string()),
    }
}

fn find_entry<'a>(listing: &'a Map<String, Value>, name: &str) -> Option<(&'a Value, bool)> {
    for (key, is_dir) in [("files", false), ("dirs", true)] {
        let Some(entries) = listing.get(key).and_then(Value::as_array) else {
            continue;
        };
        if let Some(entry) = entries
            .iter()
            .find(|e| entry_name(e).as_deref() == Some(name))
        {
            return Some((entry, is_dir));
        }
    }
    None
}

/// Display name of a listing entry: `name` if present, else the decoded `href`.
pub(crate) fn entry_name(entry: &Value) -> Option<String> {
    if let Some(name) = entry.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    let href = entry.get("href").and_then(Value::as_str)?;
    let href = href.split('?').next().unwrap_or(href).trim_end_matches('/');
    Some(percent_decode_str(href).decode_utf8_lossy().into_owned())
}
