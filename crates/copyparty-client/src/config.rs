//! Connection configuration for a copyparty server.

use crate::error::{CopypartyError, Result};
use std::fmt;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3923";
pub const DEFAULT_SHARE_PREFIX: &str = "/share/";

/// Where the copyparty server lives and how to authenticate against it.
///
/// Built once at startup and never mutated afterwards. copyparty authenticates with a password
/// only, so there is no username: requests carry HTTP Basic auth with an empty user.
#[derive(Clone)]
pub struct ConnectionConfig {
    base_url: String,
    password: Option<String>,
    share_prefix: String,
}

impl ConnectionConfig {
    /// Validate and build a configuration.
    ///
    /// An empty password is treated as "no credential".
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse as an absolute `http(s)` URL.
    pub fn new(base_url: &str, password: Option<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            CopypartyError::Config(format!("Invalid copyparty URL '{base_url}': {e}"))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CopypartyError::Config(format!(
                "Invalid copyparty URL '{base_url}': unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            password: password.filter(|p| !p.is_empty()),
            share_prefix: DEFAULT_SHARE_PREFIX.to_string(),
        })
    }

    /// Override the URL prefix under which copyparty serves shares (its `--shr` setting).
    #[must_use]
    pub fn with_share_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        self.share_prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[must_use]
    pub fn auth_configured(&self) -> bool {
        self.password.is_some()
    }

    /// Share prefix, always with leading and trailing slash.
    #[must_use]
    pub fn share_prefix(&self) -> &str {
        &self.share_prefix
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("share_prefix", &self.share_prefix)
            .finish()
    }
}
