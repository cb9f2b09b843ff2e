//! Batch orchestration: gating, sequential account loop, aggregate verdict.

use anyhow::Result;
use chrono::Local;
use tracing::{error, info, warn};

use crate::config::Account;
use crate::session::{AccountOutcome, CheckinTarget, Pacer, SessionRunner};
use crate::status::{DailyStatus, StatusStore};

/// Pacing bounds for a batch. Inter-account delays run longer than
/// intra-account step delays.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub step_pacer: Pacer,
    pub account_pacer: Pacer,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            step_pacer: Pacer::new(2, 5),
            account_pacer: Pacer::new(5, 10),
        }
    }
}

impl BatchOptions {
    /// No delays at all, for tests.
    pub fn unpaced() -> Self {
        Self {
            step_pacer: Pacer::zero(),
            account_pacer: Pacer::zero(),
        }
    }
}

/// Aggregate of one batch run.
#[derive(Debug)]
pub struct RunReport {
    /// True when a prior success for today skipped the whole run.
    pub gated: bool,
    pub outcomes: Vec<AccountOutcome>,
}

impl RunReport {
    fn gated() -> Self {
        Self { gated: true, outcomes: Vec::new() }
    }

    fn from_outcomes(outcomes: Vec<AccountOutcome>) -> Self {
        Self { gated: false, outcomes }
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn fail_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// An empty batch is a failure, never a vacuous success.
    pub fn overall_success(&self) -> bool {
        self.gated || (self.fail_count() == 0 && self.success_count() > 0)
    }

    pub fn summary(&self) -> String {
        if self.gated {
            "already checked in today".to_string()
        } else {
            format!("{} succeeded, {} failed", self.success_count(), self.fail_count())
        }
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(!self.overall_success())
    }
}

/// Run one service's accounts sequentially. Never concurrent: parallel
/// attempts from one source IP invite correlated rate-limiting.
///
/// A fault while building or driving one account becomes a failing outcome
/// and the loop continues with the rest.
pub async fn run_batch<F>(
    service: &str,
    accounts: &[Account],
    store: &StatusStore,
    options: &BatchOptions,
    make_target: F,
) -> RunReport
where
    F: Fn(&Account) -> Result<Box<dyn CheckinTarget>>,
{
    let today = Local::now().date_naive();
    if store.is_done(service, today) {
        info!(service, %today, "already checked in today, skipping run");
        return RunReport::gated();
    }

    if accounts.is_empty() {
        warn!(service, "no accounts configured");
        let record = DailyStatus::record(Local::now(), false, "no accounts configured", Vec::new());
        store.save(service, &record);
        return RunReport::from_outcomes(Vec::new());
    }

    let runner = SessionRunner::new(options.step_pacer);
    let total = accounts.len();
    let mut outcomes = Vec::with_capacity(total);

    for (idx, account) in accounts.iter().enumerate() {
        info!(service, account = idx + 1, total, "account run starting");
        let outcome = match make_target(account) {
            Ok(mut target) => runner.run(target.as_mut()).await,
            Err(err) => {
                error!(service, account = idx + 1, error = %err, "target setup failed");
                AccountOutcome {
                    username: account.masked(),
                    success: false,
                    message: format!("setup failed: {err:#}"),
                    credit_info: None,
                }
            }
        };
        if outcome.success {
            info!(service, account = %outcome.username, message = %outcome.message, "account ok");
        } else {
            error!(service, account = %outcome.username, message = %outcome.message, "account failed");
        }
        outcomes.push(outcome);

        if idx + 1 < total {
            options.account_pacer.pause().await;
        }
    }

    let report = RunReport::from_outcomes(outcomes);
    let record = DailyStatus::record(
        Local::now(),
        report.overall_success(),
        report.summary(),
        report.outcomes.clone(),
    );
    store.save(service, &record);
    report
}
