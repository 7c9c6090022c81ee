//! Reachability probe for the configured server.

use crate::http::CopypartyClient;
use serde::Serialize;
use std::time::Duration;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reachability {
    pub accessible: bool,
    /// `connected`, or `error: <description>`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl CopypartyClient {
    /// GET the base URL with a short timeout. Never fails: any HTTP answer counts as reachable,
    /// and transport errors are reported in `status`.
    pub async fn probe(&self, timeout: Duration) -> Reachability {
        match self.probe_base(timeout).await {
            Ok(code) => Reachability {
                accessible: true,
                status: "connected".to_string(),
                http_status: Some(code),
            },
            Err(e) => {
                tracing::debug!(error = %e, "copyparty probe failed");
                Reachability {
                    accessible: false,
                    status: format!("error: {e}"),
                    http_status: None,
                }
            }
        }
    }
}
