//! Command line and environment configuration.

use anyhow::Context as _;
use clap::Parser;
use copyparty_client::ConnectionConfig;
use copyparty_client::config::{DEFAULT_BASE_URL, DEFAULT_SHARE_PREFIX};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Parser)]
#[command(name = "copyparty-mcp")]
#[command(about = "Expose a copyparty file server as MCP tools over streamable HTTP")]
#[command(version)]
pub struct Cli {
    /// Base URL of the copyparty server.
    #[arg(long, env = "COPYPARTY_URL", default_value = DEFAULT_BASE_URL)]
    pub copyparty_url: String,

    /// copyparty password, sent as HTTP Basic auth with an empty username.
    #[arg(long, env = "COPYPARTY_PASSWORD", hide_env_values = true)]
    pub copyparty_password: Option<String>,

    /// URL prefix copyparty serves shares under (its `--shr` option).
    #[arg(long, env = "COPYPARTY_SHARE_PREFIX", default_value = DEFAULT_SHARE_PREFIX)]
    pub share_prefix: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Listen address; overrides `--host` and `--port`.
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Deployment label reported by `get_server_info`.
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Log filter (`tracing_subscriber::EnvFilter` syntax).
    #[arg(long, env = "COPYPARTY_MCP_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "COPYPARTY_MCP_LOG_JSON")]
    pub log_json: bool,
}

/// Settings owned by the MCP layer (not needed to talk to copyparty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub environment: String,
    pub bind: SocketAddr,
}

impl Cli {
    #[must_use]
    pub fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            environment: self.environment.clone(),
            bind: self
                .bind
                .unwrap_or_else(|| SocketAddr::new(self.host, self.port)),
        }
    }

    /// Validated connection settings for the copyparty client.
    ///
    /// # Errors
    ///
    /// Returns an error if the copyparty URL is not an absolute `http`/`https` URL.
    pub fn connection_config(&self) -> anyhow::Result<ConnectionConfig> {
        let config = ConnectionConfig::new(&self.copyparty_url, self.copyparty_password.clone())
            .with_context(|| format!("invalid copyparty URL '{}'", self.copyparty_url))?;
        Ok(config.with_share_prefix(&self.share_prefix))
    }
}
