//! Derived views of files and folders: archives, tails, plaintext, rendered documents and
//! thumbnails. All of them are generated by copyparty; this side only picks the query flag.

use crate::body::{Encoding, FilePayload, text_or_base64};
use crate::error::{CopypartyError, Result};
use crate::http::{CopypartyClient, Query};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Tar,
    Zip,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveArgs {
    /// Folder to pack.
    pub path: String,
    pub format: ArchiveFormat,
    /// tar: `gz`, `bz2`, `xz`, `pax`; zip: `utf8`, `crc`, `dos`.
    #[serde(default)]
    pub codec: Option<String>,
    /// Compression level for compressed tar codecs.
    #[serde(default)]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchivePayload {
    pub path: String,
    pub format: ArchiveFormat,
    pub content_type: String,
    pub size: usize,
    pub content: String,
    pub encoding: Encoding,
}

fn default_tail_offset() -> i64 {
    -4096
}

fn default_tail_wait() -> u64 {
    3
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TailArgs {
    pub path: String,
    /// Start offset in bytes; negative counts from the end of the file.
    #[serde(default = "default_tail_offset")]
    pub offset: i64,
    /// How long to keep reading the live stream before returning.
    #[serde(default = "default_tail_wait")]
    pub wait_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextArgs {
    pub path: String,
    /// Character set copyparty should transcode to (`?txt=<charset>`).
    #[serde(default)]
    pub charset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderArgs {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailArgs {
    pub path: String,
    /// Thumbnail format code, e.g. `w` (webp) or `j` (jpeg). Server default when unset.
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailPayload {
    pub path: String,
    pub content_type: String,
    pub mime_type: String,
    pub size: usize,
    pub content: String,
    pub encoding: Encoding,
}

impl CopypartyClient {
    /// Download a folder as a tar or zip archive (base64).
    ///
    /// # Errors
    ///
    /// Returns an error if a compression level is given for zip, on transport failure or on a
    /// non-2xx response.
    pub async fn download_archive(&self, args: &ArchiveArgs) -> Result<ArchivePayload> {
        let query = archive_query(args)?;
        let req = self.request(Method::GET, &args.path, &query)?;
        let resp = self.send(req).await?;
        let (content, encoding) = text_or_base64(&resp.bytes, true);
        Ok(ArchivePayload {
            path: args.path.clone(),
            format: args.format,
            content_type: resp.content_type_or_default(),
            size: resp.bytes.len(),
            content,
            encoding,
        })
    }

    /// Read the tail of a (possibly growing) file for up to `wait_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn tail_file(&self, args: &TailArgs) -> Result<FilePayload> {
        let query = Query::new().pair("tail", args.offset.to_string());
        let req = self.request(Method::GET, &args.path, &query)?;
        let resp = self
            .send_windowed(req, Duration::from_secs(args.wait_seconds))
            .await?;
        Ok(FilePayload::new(
            &args.path,
            resp.content_type_or_default(),
            &resp.bytes,
            false,
        ))
    }

    /// Fetch a file as plaintext (`?txt`).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn get_file_text(&self, args: &TextArgs) -> Result<FilePayload> {
        let query = Query::new().pair("txt", args.charset.clone().unwrap_or_default());
        let req = self.request(Method::GET, &args.path, &query)?;
        let resp = self.send(req).await?;
        Ok(FilePayload::new(
            &args.path,
            resp.content_type_or_default(),
            &resp.bytes,
            false,
        ))
    }

    /// Fetch the server-rendered view of a document (`?v`, e.g. markdown as HTML).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn render_file(&self, args: &RenderArgs) -> Result<FilePayload> {
        let req = self.request(Method::GET, &args.path, &Query::new().flag("v"))?;
        let resp = self.send(req).await?;
        Ok(FilePayload::new(
            &args.path,
            resp.content_type_or_default(),
            &resp.bytes,
            false,
        ))
    }

    /// Fetch a thumbnail (`?th`), always base64.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn get_thumbnail(&self, args: &ThumbnailArgs) -> Result<ThumbnailPayload> {
        let query = Query::new().pair("th", args.format.clone().unwrap_or_default());
        let req = self.request(Method::GET, &args.path, &query)?;
        let resp = self.send(req).await?;
        let content_type = resp.content_type_or_default();
        let mime_type = content_type
            .parse::<mime::Mime>()
            .map_or_else(|_| content_type.clone(), |m| m.essence_str().to_string());
        let (content, encoding) = text_or_base64(&resp.bytes, true);
        Ok(ThumbnailPayload {
            path: args.path.clone(),
            content_type,
            mime_type,
            size: resp.bytes.len(),
            content,
            encoding,
        })
    }
}

fn archive_query(args: &ArchiveArgs) -> Result<Query> {
    let codec = args.codec.clone().unwrap_or_default();
    Ok(match args.format {
        ArchiveFormat::Tar => {
            let value = match args.level {
                Some(level) if codec.is_empty() => {
                    return Err(CopypartyError::InvalidArgument(format!(
                        "compression level {level} needs a tar codec (gz, bz2, xz)"
                    )));
                }
                Some(level) => format!("{codec}:{level}"),
                None => codec,
            };
            Query::new().pair("tar", value)
        }
        ArchiveFormat::Zip => {
            if let Some(level) = args.level {
                return Err(CopypartyError::InvalidArgument(format!(
                    "zip archives do not take a compression level (got {level})"
                )));
            }
            Query::new().pair("zip", codec)
        }
    })
}
