//! Share management (`?share`, `?shares`, `?eshare`).
//!
//! Shares are served by copyparty under a configurable URL prefix (its `--shr` option); that
//! prefix is needed to address an existing share by key.

use crate::body::{Body, absolutize_url, absolutize_url_fields};
use crate::error::Result;
use crate::http::{CopypartyClient, Query};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

fn read_only_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateShareArgs {
    pub path: String,
    /// Share key; copyparty picks a random one when empty.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Minutes until expiry; `None` or 0 never expires.
    #[serde(default)]
    pub expire_minutes: Option<u64>,
    #[serde(default = "read_only_default")]
    pub read_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateShareArgs {
    pub key: String,
    pub expire_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteShareArgs {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareCreated {
    pub success: bool,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub response: Body,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareUpdated {
    pub success: bool,
    pub key: String,
    pub expire_minutes: u64,
    pub response: Body,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareDeleted {
    pub success: bool,
    pub key: String,
    pub response: Body,
}

impl CopypartyClient {
    /// Create a share for one path.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn create_share(&self, args: &CreateShareArgs) -> Result<ShareCreated> {
        let perms = if args.read_only {
            json!(["read"])
        } else {
            json!(["read", "write"])
        };
        let payload = json!({
            "k": args.key.clone().unwrap_or_default(),
            "vp": [args.path],
            "pw": args.password.clone().unwrap_or_default(),
            "exp": args.expire_minutes.unwrap_or(0).to_string(),
            "perms": perms,
        });

        let req = self
            .request(Method::POST, "/", &Query::new().flag("share"))?
            .json(&payload);
        let resp = self.send(req).await?;
        let mut response = Body::parse(&resp.bytes);
        let url = self.resolve_share_url(&mut response);

        Ok(ShareCreated {
            success: true,
            path: args.path.clone(),
            url,
            response,
        })
    }

    /// List existing shares.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn list_shares(&self) -> Result<Body> {
        let req = self.request(Method::GET, "/", &Query::new().flag("shares"))?;
        let resp = self.send(req).await?;
        let mut body = Body::parse(&resp.bytes);
        if let Body::Json(v) = &mut body {
            absolutize_url_fields(self.config().base_url(), v);
        }
        Ok(body)
    }

    /// Change a share's expiry to `expire_minutes` from now.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn update_share(&self, args: &UpdateShareArgs) -> Result<ShareUpdated> {
        let query = Query::new().pair("eshare", args.expire_minutes.to_string());
        let req = self.request(Method::POST, &self.share_path(&args.key), &query)?;
        let resp = self.send(req).await?;
        Ok(ShareUpdated {
            success: true,
            key: args.key.clone(),
            expire_minutes: args.expire_minutes,
            response: Body::parse(&resp.bytes),
        })
    }

    /// Remove a share.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn delete_share(&self, args: &DeleteShareArgs) -> Result<ShareDeleted> {
        let query = Query::new().pair("eshare", "rm");
        let req = self.request(Method::POST, &self.share_path(&args.key), &query)?;
        let resp = self.send(req).await?;
        Ok(ShareDeleted {
            success: true,
            key: args.key.clone(),
            response: Body::parse(&resp.bytes),
        })
    }

    fn share_path(&self, key: &str) -> String {
        format!("{}{}", self.config().share_prefix(), key.trim_matches('/'))
    }

    /// Pull the share URL out of a create response, making it absolute in place.
    fn resolve_share_url(&self, response: &mut Body) -> Option<String> {
        let base = self.config().base_url();
        match response {
            Body::Json(v) => {
                absolutize_url_fields(base, v);
                v.get("url").and_then(Value::as_str).map(str::to_string)
            }
            Body::Raw(text) => {
                // Plain-text replies end with the share URL, e.g. "created share: /share/abc".
                let last = text.split_whitespace().last()?;
                (last.starts_with('/')
                    || last.starts_with("http://")
                    || last.starts_with("https://"))
                .then(|| absolutize_url(base, last))
            }
        }
    }
}
