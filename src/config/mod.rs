//! Per-service configuration pulled from the environment.
//!
//! Each target reads its accounts from `<KEY>_USERNAME`/`<KEY>_PASSWORD`,
//! an optional `<KEY>_ACCOUNTS` JSON array for multi-account setups, or a
//! `<KEY>_COOKIE` pre-authenticated session string. Missing credentials are
//! fatal before any network I/O happens.

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid JSON account array: {source}")]
    MalformedAccounts {
        var: String,
        source: serde_json::Error,
    },
    #[error(
        "no accounts configured: set {prefix}_USERNAME/{prefix}_PASSWORD, \
         {prefix}_ACCOUNTS, or {prefix}_COOKIE"
    )]
    NoAccounts { prefix: String },
}

/// How an account authenticates against its target.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password { username: String, password: String },
    /// Pre-authenticated session cookie string, pasted from a browser.
    Cookie(String),
}

/// One configured account: credentials plus transport identity.
#[derive(Debug, Clone)]
pub struct Account {
    pub credentials: Credentials,
    pub user_agent: String,
}

impl Account {
    /// Redacted display form, safe for logs and the status file.
    pub fn masked(&self) -> String {
        match &self.credentials {
            Credentials::Password { username, .. } => mask_identity(username),
            Credentials::Cookie(cookie) => mask_identity(cookie),
        }
    }
}

/// Entry shape accepted in the `<KEY>_ACCOUNTS` JSON array.
#[derive(Debug, Deserialize)]
struct RawAccount {
    username: String,
    password: String,
    #[serde(default)]
    user_agent: Option<String>,
}

/// Load all accounts for a service from the process environment.
pub fn load_accounts(key: &str) -> Result<Vec<Account>, ConfigError> {
    load_accounts_from(key, |name| std::env::var(name).ok())
}

/// Env-agnostic loader; `get` maps a variable name to its value.
pub fn load_accounts_from(
    key: &str,
    get: impl Fn(&str) -> Option<String>,
) -> Result<Vec<Account>, ConfigError> {
    let prefix = key.to_uppercase();
    let default_agent = get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let mut accounts = Vec::new();

    let username = get(&format!("{prefix}_USERNAME")).unwrap_or_default();
    let password = get(&format!("{prefix}_PASSWORD")).unwrap_or_default();
    if !username.trim().is_empty() && !password.trim().is_empty() {
        accounts.push(Account {
            credentials: Credentials::Password {
                username: username.trim().to_string(),
                password: password.trim().to_string(),
            },
            user_agent: default_agent.clone(),
        });
    }

    let var = format!("{prefix}_ACCOUNTS");
    if let Some(raw) = get(&var).filter(|v| !v.trim().is_empty()) {
        let parsed: Vec<RawAccount> = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::MalformedAccounts { var, source })?;
        tracing::info!(service = key, count = parsed.len(), "loaded multi-account config");
        accounts.extend(parsed.into_iter().map(|raw| Account {
            credentials: Credentials::Password {
                username: raw.username,
                password: raw.password,
            },
            user_agent: raw.user_agent.unwrap_or_else(|| default_agent.clone()),
        }));
    }

    if let Some(cookie) = get(&format!("{prefix}_COOKIE")).filter(|v| !v.trim().is_empty()) {
        // Collapse stray whitespace from copy-pasted browser cookies.
        let cookie = cookie.split_whitespace().collect::<Vec<_>>().join(" ");
        accounts.push(Account {
            credentials: Credentials::Cookie(cookie),
            user_agent: default_agent,
        });
    }

    if accounts.is_empty() {
        return Err(ConfigError::NoAccounts { prefix });
    }
    Ok(accounts)
}

/// Optional outbound proxy URL.
pub fn proxy() -> Option<String> {
    std::env::var("HTTP_PROXY")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Verbose diagnostics toggle.
pub fn debug_enabled() -> bool {
    std::env::var("DEBUG").is_ok_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Keep the first two and last characters, hide the rest. Short identities
/// are fully redacted.
pub fn mask_identity(identity: &str) -> String {
    let chars: Vec<char> = identity.chars().collect();
    if chars.len() <= 3 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail = chars[chars.len() - 1];
    format!("{head}***{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn getter(map: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        |name| map.get(name).cloned()
    }

    #[test]
    fn single_account_from_username_password() {
        let map = env(&[("DEMO_USERNAME", "alice"), ("DEMO_PASSWORD", "secret")]);
        let accounts = load_accounts_from("demo", getter(&map)).unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(matches!(
            &accounts[0].credentials,
            Credentials::Password { username, .. } if username == "alice"
        ));
    }

    #[test]
    fn multi_account_json_extends_single() {
        let map = env(&[
            ("DEMO_USERNAME", "alice"),
            ("DEMO_PASSWORD", "secret"),
            (
                "DEMO_ACCOUNTS",
                r#"[{"username":"bob","password":"pw"},{"username":"carol","password":"pw","user_agent":"UA/1"}]"#,
            ),
        ]);
        let accounts = load_accounts_from("demo", getter(&map)).unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[2].user_agent, "UA/1");
    }

    #[test]
    fn malformed_accounts_json_is_fatal() {
        let map = env(&[("DEMO_ACCOUNTS", "not json")]);
        let err = load_accounts_from("demo", getter(&map)).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedAccounts { .. }));
    }

    #[test]
    fn cookie_account_with_whitespace_cleanup() {
        let map = env(&[("DEMO_COOKIE", "  a=1;\n b=2  ")]);
        let accounts = load_accounts_from("demo", getter(&map)).unwrap();
        assert!(matches!(
            &accounts[0].credentials,
            Credentials::Cookie(c) if c == "a=1; b=2"
        ));
    }

    #[test]
    fn empty_environment_is_an_error() {
        let map = env(&[]);
        let err = load_accounts_from("demo", getter(&map)).unwrap_err();
        assert!(err.to_string().contains("DEMO_USERNAME"));
    }

    #[test]
    fn masking_keeps_only_edges() {
        assert_eq!(mask_identity("alice@example.com"), "al***m");
        assert_eq!(mask_identity("abc"), "***");
        assert_eq!(mask_identity(""), "***");
        // multi-byte identities must not split characters
        assert_eq!(mask_identity("用户名字"), "用户***字");
    }
}
