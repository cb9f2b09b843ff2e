//! Per-account check-in lifecycle: status check, login, check-in, info fetch.
//!
//! The runner drives a [`CheckinTarget`] through its steps in order, pauses
//! between steps to look less like a bot, and turns transport faults into
//! failing outcomes instead of aborting the batch.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Lifecycle step names, used in messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    StatusCheck,
    Login,
    CheckIn,
    InfoFetch,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::StatusCheck => write!(f, "status-check"),
            Step::Login => write!(f, "login"),
            Step::CheckIn => write!(f, "check-in"),
            Step::InfoFetch => write!(f, "info-fetch"),
        }
    }
}

/// Classified result of one step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: Step,
    pub succeeded: bool,
    pub message: String,
}

impl StepOutcome {
    pub fn ok(step: Step, message: impl Into<String>) -> Self {
        Self { step, succeeded: true, message: message.into() }
    }

    pub fn fail(step: Step, message: impl Into<String>) -> Self {
        Self { step, succeeded: false, message: message.into() }
    }

    /// A transport or unexpected fault, folded into a failing outcome.
    pub fn fault(step: Step, err: &anyhow::Error) -> Self {
        Self::fail(step, format!("{step} fault: {err:#}"))
    }
}

/// What the optional status endpoint reports about today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninState {
    Signed,
    Unsigned,
    Unknown,
}

/// Final per-account verdict, appended to the daily status record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOutcome {
    /// Masked identity; raw credentials never reach the status file.
    pub username: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_info: Option<String>,
}

/// One target service as seen by the runner. Implementations own their HTTP
/// client and translate endpoint quirks into classified [`StepOutcome`]s;
/// an `Err` means a fault below the business level (transport, setup).
#[async_trait]
pub trait CheckinTarget: Send {
    /// Masked identity for logs and the status record.
    fn identity(&self) -> String;

    /// Query today's sign-in state. Targets without a status endpoint keep
    /// the default and report `Unknown`.
    async fn check_status(&mut self) -> anyhow::Result<SigninState> {
        Ok(SigninState::Unknown)
    }

    /// Authenticate. Cookie-auth targets succeed trivially here; the cookie
    /// is validated by the later steps.
    async fn login(&mut self) -> anyhow::Result<StepOutcome>;

    /// Submit the check-in action.
    async fn check_in(&mut self) -> anyhow::Result<StepOutcome>;

    /// Best-effort auxiliary info (credit balance). Advisory only: failure
    /// never flips the account verdict.
    async fn fetch_info(&mut self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

/// Randomized blocking delay between steps. Zeroed in tests so pacing never
/// affects classification or ordering.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Pacer {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        let (min, max) = (min_secs.min(max_secs), min_secs.max(max_secs));
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub fn zero() -> Self {
        Self { min: Duration::ZERO, max: Duration::ZERO }
    }

    pub async fn pause(&self) {
        if self.max.is_zero() {
            return;
        }
        let delay = rand::thread_rng().gen_range(self.min..=self.max);
        debug!(?delay, "pacing delay");
        tokio::time::sleep(delay).await;
    }
}

/// Drives one account through the full lifecycle.
pub struct SessionRunner {
    pacer: Pacer,
}

impl SessionRunner {
    pub fn new(pacer: Pacer) -> Self {
        Self { pacer }
    }

    pub async fn run(&self, target: &mut dyn CheckinTarget) -> AccountOutcome {
        let who = target.identity();

        match target.check_status().await {
            Ok(SigninState::Signed) => {
                info!(account = %who, "already checked in today, skipping");
                return AccountOutcome {
                    username: who,
                    success: true,
                    message: "already checked in today".to_string(),
                    credit_info: None,
                };
            }
            Ok(SigninState::Unsigned) => debug!(account = %who, "not yet checked in"),
            Ok(SigninState::Unknown) => {}
            // The status endpoint is advisory; try the real thing anyway.
            Err(err) => {
                warn!(account = %who, error = %err, "status check failed, attempting check-in anyway");
            }
        }
        self.pacer.pause().await;

        let login = match target.login().await {
            Ok(outcome) => outcome,
            Err(err) => StepOutcome::fault(Step::Login, &err),
        };
        if !login.succeeded {
            // Terminal: no automatic re-login, no blind check-in attempt.
            warn!(account = %who, message = %login.message, "login failed");
            return AccountOutcome {
                username: who,
                success: false,
                message: login.message,
                credit_info: None,
            };
        }
        debug!(account = %who, message = %login.message, "login ok");
        self.pacer.pause().await;

        let checkin = match target.check_in().await {
            Ok(outcome) => outcome,
            Err(err) => StepOutcome::fault(Step::CheckIn, &err),
        };
        self.pacer.pause().await;

        let credit_info = match target.fetch_info().await {
            Ok(info) => info,
            Err(err) => {
                warn!(account = %who, error = %err, "info fetch failed (advisory)");
                None
            }
        };

        AccountOutcome {
            username: who,
            success: checkin.succeeded,
            message: checkin.message,
            credit_info,
        }
    }
}
