//! yc.yuchengyouxi.com -- token-gated login, check-in, and credit info.
//!
//! Login needs an anti-forgery token scraped from the login page first.
//! The ajax replies use `success: "error"` to flag failure; anything else
//! counts as accepted. Credit info is scraped from the profile page and is
//! purely advisory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::classify::message_of;
use crate::config::{mask_identity, Account, Credentials};
use crate::session::{CheckinTarget, Step, StepOutcome};
use crate::transport::{build_client, send_with_retry};

const HOST: &str = "yc.yuchengyouxi.com";

pub struct Yuchen {
    client: Client,
    username: String,
    password: String,
}

impl Yuchen {
    pub fn new(account: &Account, proxy: Option<&str>) -> Result<Self> {
        let Credentials::Password { username, password } = &account.credentials else {
            anyhow::bail!("yuchen requires username/password credentials");
        };
        Ok(Self {
            client: build_client(&account.user_agent, proxy)?,
            username: username.clone(),
            password: password.clone(),
        })
    }

    async fn fetch_token(&self) -> Result<Option<String>> {
        let url = format!("https://{HOST}/login");
        let response = send_with_retry(self.client.get(&url).header("Referer", format!("https://{HOST}/")))
            .await?
            .error_for_status()
            .context("login page request failed")?;
        let html = response.text().await?;
        Ok(extract_token(&html))
    }

    async fn post_action(&self, form: &[(&str, &str)]) -> Result<Value> {
        let url = format!("https://{HOST}/wp-admin/admin-ajax.php");
        let response = send_with_retry(
            self.client
                .post(&url)
                .header("Origin", format!("https://{HOST}"))
                .header("Referer", format!("https://{HOST}/"))
                .form(form),
        )
        .await?
        .error_for_status()
        .context("ajax request failed")?;
        let value: Value = response.json().await.context("ajax reply is not JSON")?;
        debug!(reply = %value, "ajax reply");
        Ok(value)
    }
}

/// The reply flags failure with `success: "error"`; a missing field is
/// treated the same way.
fn reply_accepted(reply: &Value) -> bool {
    match reply.get("success") {
        Some(Value::String(s)) => s != "error",
        Some(_) => true,
        None => false,
    }
}

/// Pull the anti-forgery token out of the login page.
fn extract_token(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(r#"input[name="token"]"#).unwrap();
    doc.select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// Pull the credit banner out of the profile page.
fn extract_credit(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("div.header_tips").unwrap();
    doc.select(&selector).next().map(|div| {
        div.text().collect::<String>().trim().to_string()
    })
}

#[async_trait]
impl CheckinTarget for Yuchen {
    fn identity(&self) -> String {
        mask_identity(&self.username)
    }

    async fn login(&mut self) -> Result<StepOutcome> {
        let Some(token) = self.fetch_token().await? else {
            // Submitting without the token is pointless; fail loudly with a
            // message that distinguishes this from bad credentials.
            return Ok(StepOutcome::fail(Step::Login, "could not obtain required token"));
        };
        debug!(token = %mask_identity(&token), "login token obtained");

        let redirect = format!("https://{HOST}/");
        let reply = self
            .post_action(&[
                ("user_login", &self.username),
                ("password", &self.password),
                ("rememberme", "1"),
                ("redirect", &redirect),
                ("action", "userlogin_form"),
                ("token", &token),
            ])
            .await?;

        let message = message_of(Some(&reply)).unwrap_or_default().to_string();
        Ok(if reply_accepted(&reply) {
            StepOutcome::ok(Step::Login, if message.is_empty() { "login ok".to_string() } else { message })
        } else {
            StepOutcome::fail(
                Step::Login,
                if message.is_empty() { "login rejected".to_string() } else { message },
            )
        })
    }

    async fn check_in(&mut self) -> Result<StepOutcome> {
        let reply = self.post_action(&[("action", "daily_sign")]).await?;
        let message = message_of(Some(&reply)).unwrap_or_default().to_string();
        Ok(if reply_accepted(&reply) {
            StepOutcome::ok(
                Step::CheckIn,
                if message.is_empty() { "check-in success".to_string() } else { message },
            )
        } else {
            StepOutcome::fail(
                Step::CheckIn,
                if message.is_empty() { "check-in rejected".to_string() } else { message },
            )
        })
    }

    async fn fetch_info(&mut self) -> Result<Option<String>> {
        let url = format!("https://{HOST}/users?tab=credit");
        let response = send_with_retry(self.client.get(&url))
            .await?
            .error_for_status()
            .context("credit page request failed")?;
        let html = response.text().await?;
        Ok(extract_credit(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_extracted_from_login_form() {
        let html = r#"
            <html><body>
              <form id="login">
                <input type="text" name="user_login">
                <input type="hidden" name="token" value="abc123def">
              </form>
            </body></html>"#;
        assert_eq!(extract_token(html), Some("abc123def".to_string()));
    }

    #[test]
    fn missing_token_input_yields_none() {
        assert_eq!(extract_token("<html><body>no form here</body></html>"), None);
        assert_eq!(extract_token(r#"<input name="token">"#), None);
    }

    #[test]
    fn credit_banner_text_is_trimmed() {
        let html = r#"<div class="header_tips">  当前积分：<b>128</b>  </div>"#;
        assert_eq!(extract_credit(html), Some("当前积分：128".to_string()));
        assert_eq!(extract_credit("<div class='other'>x</div>"), None);
    }

    #[test]
    fn error_success_field_means_rejected() {
        assert!(!reply_accepted(&json!({"success": "error", "msg": "密码错误"})));
        assert!(reply_accepted(&json!({"success": "ok", "msg": "签到成功"})));
        assert!(reply_accepted(&json!({"success": true})));
        assert!(!reply_accepted(&json!({"msg": "no verdict field"})));
    }
}
