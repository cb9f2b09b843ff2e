//! huaxiashuyu.com -- WordPress admin-ajax login and check-in.
//!
//! Both steps POST form actions to the same ajax endpoint. The reply shape
//! is inconsistent (sometimes `status`, sometimes `msg` only), so both
//! steps lean on the heuristic classifier.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::classify::{message_of, RuleSet};
use crate::config::{mask_identity, Account, Credentials};
use crate::session::{CheckinTarget, Step, StepOutcome};
use crate::transport::{build_client, send_with_retry};

const AJAX_URL: &str = "https://www.huaxiashuyu.com/wp-admin/admin-ajax.php";

pub struct Huaxia {
    client: Client,
    username: String,
    password: String,
    rules: RuleSet,
}

impl Huaxia {
    pub fn new(account: &Account, proxy: Option<&str>) -> Result<Self> {
        let Credentials::Password { username, password } = &account.credentials else {
            anyhow::bail!("huaxia requires username/password credentials");
        };
        Ok(Self {
            client: build_client(&account.user_agent, proxy)?,
            username: username.clone(),
            password: password.clone(),
            rules: RuleSet::default(),
        })
    }

    async fn post_action(&self, form: &[(&str, &str)]) -> Result<(Option<Value>, String)> {
        let request = self
            .client
            .post(AJAX_URL)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("X-Requested-With", "XMLHttpRequest")
            .form(form);
        let response = send_with_retry(request).await?;
        let text = response.text().await?;
        let parsed = serde_json::from_str(&text).ok();
        let excerpt: String = text.chars().take(300).collect();
        debug!(body = %excerpt, "ajax reply");
        Ok((parsed, text))
    }

    fn interpret(&self, step: Step, parsed: Option<&Value>, text: &str) -> StepOutcome {
        if parsed.is_none() {
            // Non-JSON where JSON expected; the raw-text heuristic still
            // gets a say before we call it a failure.
            if self.rules.classify(None, text) {
                return StepOutcome::ok(step, format!("{step} ok (non-standard reply)"));
            }
            let excerpt: String = text.chars().take(100).collect();
            return StepOutcome::fail(step, format!("unparsable {step} reply: {excerpt}"));
        }
        let message = message_of(parsed).unwrap_or_default().to_string();
        if self.rules.classify(parsed, text) {
            let message = if message.is_empty() { format!("{step} ok") } else { message };
            return StepOutcome::ok(step, message);
        }
        // The server reports "already checked in" as a failure; for our
        // purposes the day's goal is met.
        if step == Step::CheckIn && (message.contains("已签") || message.contains("重复")) {
            return StepOutcome::ok(step, message);
        }
        let message = if message.is_empty() { format!("{step} rejected") } else { message };
        StepOutcome::fail(step, message)
    }
}

#[async_trait]
impl CheckinTarget for Huaxia {
    fn identity(&self) -> String {
        mask_identity(&self.username)
    }

    async fn login(&mut self) -> Result<StepOutcome> {
        let (parsed, text) = self
            .post_action(&[
                ("action", "user_login"),
                ("username", &self.username),
                ("password", &self.password),
            ])
            .await?;
        Ok(self.interpret(Step::Login, parsed.as_ref(), &text))
    }

    async fn check_in(&mut self) -> Result<StepOutcome> {
        let (parsed, text) = self.post_action(&[("action", "user_qiandao")]).await?;
        Ok(self.interpret(Step::CheckIn, parsed.as_ref(), &text))
    }
}
