//! Server-side search and the recent-uploads views.

use crate::body::Body;
use crate::error::Result;
use crate::files::root_path;
use crate::http::{CopypartyClient, Query};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchFilesArgs {
    /// copyparty search expression, e.g. `name like *.flac and size > 1024`.
    pub query: String,
    /// Volume path to restrict the search to; `/` searches everything.
    #[serde(default = "root_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecentUploadsArgs {
    #[serde(default)]
    pub filter_path: Option<String>,
    /// Show everyone's uploads (`?ru`, admin only) instead of this client's (`?ups`).
    #[serde(default)]
    pub all_uploads: bool,
    #[serde(default)]
    pub as_json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentUploads {
    pub success: bool,
    pub uploads: Body,
}

impl CopypartyClient {
    /// Run a search on the server's index.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn search_files(&self, args: &SearchFilesArgs) -> Result<Body> {
        let req = self
            .request(Method::POST, "/", &Query::new().flag("srch"))?
            .json(&search_body(args));
        let resp = self.send(req).await?;
        Ok(Body::parse(&resp.bytes))
    }

    /// Recent uploads, as JSON when the server sends JSON and raw text otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn get_recent_uploads(&self, args: &RecentUploadsArgs) -> Result<RecentUploads> {
        let query = Query::new()
            .flag(if args.all_uploads { "ru" } else { "ups" })
            .pair_opt(
                "filter",
                args.filter_path.as_deref().filter(|f| !f.is_empty()),
            )
            .flag_if(args.as_json, "j");
        let req = self.request(Method::GET, "/", &query)?;
        let resp = self.send(req).await?;
        Ok(RecentUploads {
            success: true,
            uploads: Body::parse(&resp.bytes),
        })
    }
}

fn search_body(args: &SearchFilesArgs) -> Value {
    let mut body = Map::new();
    body.insert("q".to_string(), Value::String(args.query.clone()));
    if args.path != "/" {
        body.insert("v".to_string(), Value::String(args.path.clone()));
    }
    Value::Object(body)
}
