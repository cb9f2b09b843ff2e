//! Target services: endpoint shapes and per-step semantics.
//!
//! Each target owns its HTTP client and translates its service's quirks
//! into classified step outcomes. Endpoint shapes are fixed by the remote
//! side and not under our control.

pub mod huaxia;
pub mod kanxue;
pub mod yuchen;

use anyhow::Result;

use crate::config::Account;
use crate::session::CheckinTarget;

/// Known service keys, in run order for `run-all`.
pub const SERVICE_KEYS: [&str; 3] = ["huaxia", "kanxue", "yuchen"];

/// Build the target implementation for a service key.
pub fn build_target(
    key: &str,
    account: &Account,
    proxy: Option<&str>,
) -> Result<Box<dyn CheckinTarget>> {
    match key {
        "huaxia" => Ok(Box::new(huaxia::Huaxia::new(account, proxy)?)),
        "kanxue" => Ok(Box::new(kanxue::Kanxue::new(account, proxy)?)),
        "yuchen" => Ok(Box::new(yuchen::Yuchen::new(account, proxy)?)),
        other => anyhow::bail!("unknown service '{other}' (known: {})", SERVICE_KEYS.join(", ")),
    }
}
