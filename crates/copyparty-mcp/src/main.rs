//! `copyparty-mcp`: serve copyparty file operations as MCP tools over streamable HTTP.

mod annotations;
mod config;
mod error;
mod server;
mod tools;

use anyhow::Context as _;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use config::Cli;
use copyparty_client::CopypartyClient;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use server::CopypartyMcp;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(filter: &str, json: bool) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let settings = cli.server_settings();
    let connection = cli.connection_config()?;
    let bind = settings.bind;

    tracing::info!(
        copyparty_url = connection.base_url(),
        auth_configured = connection.auth_configured(),
        share_prefix = connection.share_prefix(),
        environment = %settings.environment,
        "starting copyparty MCP server"
    );

    let client = CopypartyClient::new(connection).context("build copyparty client")?;
    let handler = CopypartyMcp::new(client, settings);

    let mcp = StreamableHttpService::new(
        move || Ok(handler.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", mcp);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    tracing::info!(addr = %bind, "listening (MCP endpoint at /mcp)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    tracing::info!("shutdown complete");
    Ok(())
}
