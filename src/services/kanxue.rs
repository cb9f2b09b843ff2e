//! bbs.kanxue.com -- cookie-authenticated status check and check-in.
//!
//! No login endpoint: a browser cookie is the whole identity. The forum
//! exposes a status endpoint (`user-is_signin.htm`) so most days the run
//! ends before it touches the check-in endpoint at all.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, ORIGIN, REFERER};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::classify::RuleSet;
use crate::config::{mask_identity, Account, Credentials};
use crate::session::{CheckinTarget, SigninState, Step, StepOutcome};
use crate::transport::{send_with_retry, CONNECT_TIMEOUT, READ_TIMEOUT};

const BASE: &str = "https://bbs.kanxue.com";

pub struct Kanxue {
    client: Client,
    masked: String,
    rules: RuleSet,
}

impl Kanxue {
    pub fn new(account: &Account, proxy: Option<&str>) -> Result<Self> {
        let Credentials::Cookie(cookie) = &account.credentials else {
            anyhow::bail!("kanxue requires a pre-authenticated cookie (KANXUE_COOKIE)");
        };

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).context("cookie is not a valid header value")?);
        headers.insert(ORIGIN, HeaderValue::from_static(BASE));
        headers.insert(REFERER, HeaderValue::from_static("https://bbs.kanxue.com/"));
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );

        let mut builder = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .default_headers(headers)
            .user_agent(&account.user_agent);
        if let Some(url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(url).context("invalid proxy URL")?);
        }

        Ok(Self {
            client: builder.build().context("failed to build HTTP client")?,
            masked: mask_identity(cookie),
            rules: RuleSet::default(),
        })
    }

    /// Interpret the status endpoint's reply. `code 0` plus an
    /// already-signed message means signed; `code 1` means not yet.
    fn parse_signin_state(body: &str) -> SigninState {
        let Ok(parsed) = serde_json::from_str::<Value>(body) else {
            return SigninState::Unknown;
        };
        let code = field_as_string(&parsed, "code");
        let message = field_as_string(&parsed, "message");
        match code.as_str() {
            "0" if message.contains("已签到") => SigninState::Signed,
            "1" => SigninState::Unsigned,
            _ => SigninState::Unknown,
        }
    }

    /// Interpret the check-in reply, HTTP status included. A 403 is the
    /// forum's anti-automation block and gets its own message.
    fn interpret_checkin(&self, http_status: StatusCode, body: &str) -> StepOutcome {
        if http_status == StatusCode::FORBIDDEN {
            return StepOutcome::fail(
                Step::CheckIn,
                "blocked by anti-automation check (HTTP 403), try again later",
            );
        }
        if http_status != StatusCode::OK {
            return StepOutcome::fail(
                Step::CheckIn,
                format!("check-in request failed with HTTP {}", http_status.as_u16()),
            );
        }

        let Ok(parsed) = serde_json::from_str::<Value>(body) else {
            // raw-text heuristic gets the last word on non-JSON bodies
            if self.rules.classify(None, body) {
                return StepOutcome::ok(Step::CheckIn, "check-in success (non-standard reply)");
            }
            let excerpt: String = body.chars().take(100).collect();
            return StepOutcome::fail(Step::CheckIn, format!("unparsable check-in reply: {excerpt}"));
        };

        let code = field_as_string(&parsed, "code");
        let message = field_as_string(&parsed, "message");
        if code == "0" {
            if !message.is_empty() && message.chars().all(|c| c.is_ascii_digit()) {
                // the forum replies with the running total on success
                return StepOutcome::ok(
                    Step::CheckIn,
                    format!("check-in success, consecutive check-in {message} days"),
                );
            }
            let message = if message.is_empty() { "check-in success".to_string() } else { message };
            return StepOutcome::ok(Step::CheckIn, message);
        }
        if message.contains("已签到") {
            return StepOutcome::ok(Step::CheckIn, message);
        }
        let message = if message.is_empty() {
            format!("check-in rejected (code {code})")
        } else {
            message
        };
        StepOutcome::fail(Step::CheckIn, message)
    }
}

/// String view of a JSON field, tolerating numeric codings.
fn field_as_string(value: &Value, name: &str) -> String {
    match value.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl CheckinTarget for Kanxue {
    fn identity(&self) -> String {
        self.masked.clone()
    }

    async fn check_status(&mut self) -> Result<SigninState> {
        let url = format!("{BASE}/user-is_signin.htm");
        let response = send_with_retry(self.client.get(&url)).await?;
        if response.status() != StatusCode::OK {
            debug!(status = %response.status(), "status endpoint unhappy");
            return Ok(SigninState::Unknown);
        }
        let body = response.text().await?;
        debug!(body = %body, "sign-in status reply");
        Ok(Self::parse_signin_state(&body))
    }

    async fn login(&mut self) -> Result<StepOutcome> {
        // Identity is the cookie itself; validation happens on the next step.
        Ok(StepOutcome::ok(Step::Login, "using pre-authenticated cookie"))
    }

    async fn check_in(&mut self) -> Result<StepOutcome> {
        let url = format!("{BASE}/user-signin.htm");
        let response = send_with_retry(self.client.post(&url).form::<[(&str, &str); 0]>(&[])).await?;
        let http_status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(self.interpret_checkin(http_status, &body))
    }
}
