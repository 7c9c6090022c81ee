use anyhow::Context as _;
use std::process::{Child, Command};
use std::time::Duration;

pub use copyparty_test_support::{KillOnDrop, MockCopyparty, MockResponse};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    copyparty_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    copyparty_test_support::wait_http_ok(url, timeout_dur).await
}

/// Start the server binary against `copyparty_url` and wait for `/health`.
///
/// Environment variables from the test runner are cleared for the options under test so a
/// developer's shell cannot leak into the child.
pub async fn spawn_server(
    copyparty_url: &str,
    password: Option<&str>,
) -> anyhow::Result<(KillOnDrop, String)> {
    let port = pick_unused_port()?;
    let bin = env!("CARGO_BIN_EXE_copyparty-mcp");
    let mut cmd = Command::new(bin);
    cmd.env_remove("COPYPARTY_PASSWORD")
        .env_remove("COPYPARTY_SHARE_PREFIX")
        .env("COPYPARTY_URL", copyparty_url)
        .env("ENVIRONMENT", "integration")
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info");
    if let Some(pw) = password {
        cmd.env("COPYPARTY_PASSWORD", pw);
    }
    let child: Child = cmd.spawn().context("spawn copyparty-mcp")?;
    let guard = KillOnDrop(child);

    let base = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base}/health"), Duration::from_secs(20)).await?;
    Ok((guard, base))
}
