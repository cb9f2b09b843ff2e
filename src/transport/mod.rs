//! HTTP transport: client construction and bounded retry.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::warn;

/// Distinct connect/read timeouts bound total run duration even when a
/// target stalls mid-response.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_ATTEMPTS: u32 = 3;

const RETRYABLE: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Build a session client: cookie jar, timeouts, identity, optional proxy.
pub fn build_client(user_agent: &str, proxy: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(READ_TIMEOUT)
        .cookie_store(true)
        .user_agent(user_agent);
    if let Some(url) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(url).context("invalid proxy URL")?);
    }
    builder.build().context("failed to build HTTP client")
}

/// Send with bounded retry on transient failures: retryable status codes,
/// connect errors, and timeouts. Backoff is linear; other errors and all
/// other statuses return immediately.
pub async fn send_with_retry(request: RequestBuilder) -> reqwest::Result<Response> {
    for attempt in 1..MAX_ATTEMPTS {
        let Some(this_try) = request.try_clone() else {
            break;
        };
        match this_try.send().await {
            Ok(resp) if !RETRYABLE.contains(&resp.status()) => return Ok(resp),
            Ok(resp) => {
                warn!(status = %resp.status(), attempt, "retryable status, backing off");
            }
            Err(err) if err.is_connect() || err.is_timeout() => {
                warn!(error = %err, attempt, "transport error, backing off");
            }
            Err(err) => return Err(err),
        }
        tokio::time::sleep(Duration::from_secs(u64::from(attempt))).await;
    }
    request.send().await
}
