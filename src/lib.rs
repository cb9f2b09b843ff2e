//! daily-checkin -- scheduled daily check-in runner for web forums and portals.
//!
//! The core is an idempotent orchestration loop: a per-day status file gates
//! re-runs, a session runner drives each account through its check-in
//! lifecycle, and a heuristic classifier decides what the target's
//! inconsistent replies actually mean.

pub mod batch;
pub mod classify;
pub mod config;
pub mod services;
pub mod session;
pub mod status;
pub mod summary;
pub mod transport;

use anyhow::Result;
use chrono::Local;

/// Exit code used when the run is interrupted before completing.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Run one service end to end and return the process exit code.
///
/// 0 means every configured account succeeded (or today's run was already
/// done); 1 means any failure or missing configuration. On Ctrl-C the run
/// stops without writing a status record, so a partial run can never gate
/// tomorrow's retry as a success.
pub async fn run_service(key: &str) -> Result<i32> {
    summary::print_banner(key);

    let store = status::StatusStore::default_location();
    if store.is_done(key, Local::now().date_naive()) {
        tracing::info!(service = key, "already checked in today, nothing to do");
        println!("  already checked in today, nothing to do");
        return Ok(0);
    }

    let accounts = match config::load_accounts(key) {
        Ok(accounts) => accounts,
        Err(err) => {
            tracing::error!(service = key, error = %err, "configuration error");
            let record = status::DailyStatus::record(
                Local::now(),
                false,
                format!("configuration error: {err}"),
                Vec::new(),
            );
            store.save(key, &record);
            return Ok(1);
        }
    };
    tracing::info!(service = key, count = accounts.len(), "accounts loaded");

    let proxy = config::proxy();
    if let Some(url) = &proxy {
        tracing::info!(proxy = %url, "using outbound proxy");
    }

    let options = batch::BatchOptions::default();
    let report = tokio::select! {
        report = batch::run_batch(key, &accounts, &store, &options, |account| {
            services::build_target(key, account, proxy.as_deref())
        }) => report,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!(service = key, "interrupted, exiting without saving status");
            return Ok(EXIT_INTERRUPTED);
        }
    };

    summary::print_report(key, &report);
    summary::append_ci_summary(key, &report);
    Ok(report.exit_code())
}
