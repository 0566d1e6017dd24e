//! Best-effort refresh notification to the downstream bot.
//!
//! After a successful build the bot is asked to reload its data. The call
//! is fire-and-forget: the orchestrator logs a returned error and moves on.

use std::time::Duration;

use reqwest::Client;
use tracing::info;
use url::Url;

use kbpress_shared::{PublishError, Result};

/// Timeout for the refresh request. Shorter than table fetches; a slow bot
/// must not hold the run open.
const NOTIFY_TIMEOUT_SECS: u64 = 20;

/// Longest response body fragment written to the log.
const BODY_LOG_LIMIT: usize = 200;

/// User-Agent string for refresh requests.
const USER_AGENT: &str = concat!("kbpress/", env!("CARGO_PKG_VERSION"));

/// POST the refresh endpoint with the shared admin token.
///
/// The HTTP outcome (status plus a truncated body) is logged whatever it
/// is; only a transport-level failure is returned as an error.
pub async fn notify_refresh(endpoint: &str, token: &str) -> Result<()> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| PublishError::Notify(format!("invalid refresh URL {endpoint}: {e}")))?;
    url.query_pairs_mut().append_pair("admin_token", token);

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
        .build()
        .map_err(|e| PublishError::Notify(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .post(url)
        .send()
        .await
        .map_err(|e| PublishError::Notify(e.to_string()))?;

    let status = response.status();
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(BODY_LOG_LIMIT)
        .collect();

    info!(status = status.as_u16(), body = %body, "refresh notification sent");

    Ok(())
}
