mod common;
mod common_mcp;

use anyhow::Context as _;
use serde_json::json;
use std::time::Duration;

use common::{MockCopyparty, MockResponse, pick_unused_port, spawn_server};
use common_mcp::{McpStreamableHttpSession, is_tool_error, tool_result_json};

fn tool_names(msg: &serde_json::Value) -> Vec<String> {
    msg.pointer("/result/tools")
        .and_then(serde_json::Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .filter_map(|t| t.get("name").and_then(serde_json::Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test(flavor = "multi_thread")]
async fn health_and_tools_list() -> anyhow::Result<()> {
    let mock = MockCopyparty::fixed(MockResponse::text("ok")).await?;
    let (_server, base) = spawn_server(mock.base_url(), None).await?;

    let health = reqwest::get(format!("{base}/health")).await?.text().await?;
    assert_eq!(health, "ok");

    let session = McpStreamableHttpSession::connect(&base).await?;
    let msg = session
        .request(1, "tools/list", json!({}), Duration::from_secs(10))
        .await?;
    let names = tool_names(&msg);
    assert_eq!(names.len(), 22, "{names:?}");
    for expected in [
        "list_files",
        "download_file",
        "upload_file",
        "search_files",
        "get_file_metadata",
        "create_share",
        "get_server_info",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }

    let delete = msg
        .pointer("/result/tools")
        .and_then(serde_json::Value::as_array)
        .and_then(|tools| tools.iter().find(|t| t["name"] == "delete_file"))
        .context("delete_file listed")?;
    assert_eq!(delete.pointer("/annotations/destructiveHint"), Some(&json!(true)));
    assert_eq!(delete.pointer("/annotations/openWorldHint"), Some(&json!(true)));

    // tools/list does not talk to copyparty.
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tool_calls_reach_copyparty_with_auth() -> anyhow::Result<()> {
    let mock = MockCopyparty::start(|req| {
        if req.has_query("ls") {
            MockResponse::json(&json!({
                "dirs": [],
                "files": [{"href": "song.flac", "sz": 42, "ts": 1_700_000_000}]
            }))
        } else if req.has_query("delete") {
            MockResponse::text("deleted")
        } else {
            MockResponse::status(400, "unexpected request")
        }
    })
    .await?;
    let (_server, base) = spawn_server(mock.base_url(), Some("hunter2")).await?;
    let session = McpStreamableHttpSession::connect(&base).await?;

    let msg = session
        .call_tool(1, "list_files", json!({"path": "/music/"}))
        .await?;
    assert!(!is_tool_error(&msg), "{msg}");
    let listing = tool_result_json(&msg)?;
    assert_eq!(listing["files"][0]["href"], "song.flac");

    let msg = session
        .call_tool(2, "delete_multiple_files", json!({"paths": ["/a", "/b"]}))
        .await?;
    assert!(!is_tool_error(&msg), "{msg}");
    let deleted = tool_result_json(&msg)?;
    assert_eq!(deleted["count"], 2);
    assert_eq!(deleted["paths"], json!(["/a", "/b"]));

    let seen = mock.requests();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].path, "/music/");
    assert_eq!(seen[1].body_json()?, json!(["/a", "/b"]));
    for req in &seen {
        // base64(":hunter2")
        assert_eq!(req.header("authorization"), Some("Basic Omh1bnRlcjI="));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_errors_are_tool_errors() -> anyhow::Result<()> {
    let mock =
        MockCopyparty::fixed(MockResponse::status(403, "you don't have write-access")).await?;
    let (_server, base) = spawn_server(mock.base_url(), None).await?;
    let session = McpStreamableHttpSession::connect(&base).await?;

    let msg = session
        .call_tool(1, "delete_file", json!({"path": "/readonly/a.txt"}))
        .await?;
    assert!(is_tool_error(&msg), "{msg}");
    let err = tool_result_json(&msg)?;
    assert_eq!(err["error"]["kind"], "remote_request");
    assert_eq!(err["error"]["status"], 403);
    assert_eq!(err["error"]["body"], "you don't have write-access");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_tool_is_invalid_params() -> anyhow::Result<()> {
    let mock = MockCopyparty::fixed(MockResponse::text("ok")).await?;
    let (_server, base) = spawn_server(mock.base_url(), None).await?;
    let session = McpStreamableHttpSession::connect(&base).await?;

    let msg = session.call_tool(1, "format_disk", json!({})).await?;
    assert_eq!(msg.pointer("/error/code"), Some(&json!(-32602)), "{msg}");
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn server_info_survives_unreachable_copyparty() -> anyhow::Result<()> {
    let dead_port = pick_unused_port()?;
    let (_server, base) = spawn_server(&format!("http://127.0.0.1:{dead_port}"), None).await?;
    let session = McpStreamableHttpSession::connect(&base).await?;

    let msg = session.call_tool(1, "get_server_info", json!({})).await?;
    assert!(!is_tool_error(&msg), "{msg}");
    let info = tool_result_json(&msg)?;
    assert_eq!(info["mcp_server_name"], "copyparty MCP Server");
    assert_eq!(info["environment"], "integration");
    assert_eq!(info["copyparty_accessible"], false);
    assert_eq!(info["authentication_configured"], false);
    assert!(
        info["copyparty_status"]
            .as_str()
            .is_some_and(|s| s.starts_with("error: ")),
        "{info}"
    );
    Ok(())
}
