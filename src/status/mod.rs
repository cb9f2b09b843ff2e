//! Per-service daily status records, the re-run gate.
//!
//! One JSON document per service under a fixed directory. Reads fail soft
//! (any error means "no record"); writes are logged but never fatal. The
//! file is a gate, not a history log: each save replaces the previous day.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::session::AccountOutcome;

/// Wire shape of `status/status_<key>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatus {
    /// Calendar day, `YYYY-MM-DD`, local time.
    pub date: String,
    pub success: bool,
    pub message: String,
    /// `YYYY-MM-DD HH:MM:SS`, for humans reading the file.
    pub timestamp: String,
    #[serde(default)]
    pub accounts_detail: Vec<AccountOutcome>,
}

impl DailyStatus {
    pub fn record(
        now: DateTime<Local>,
        success: bool,
        message: impl Into<String>,
        accounts_detail: Vec<AccountOutcome>,
    ) -> Self {
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            success,
            message: message.into(),
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            accounts_detail,
        }
    }

    pub fn is_for(&self, day: NaiveDate) -> bool {
        self.date == day.format("%Y-%m-%d").to_string()
    }
}

/// File-backed store, one record per service key.
pub struct StatusStore {
    dir: PathBuf,
}

impl StatusStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The conventional relative location used by the scheduler workflow.
    pub fn default_location() -> Self {
        Self::new("status")
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("status_{key}.json"))
    }

    /// Load the record for a service. Missing file, unreadable file, or
    /// unparsable JSON all mean "no record".
    pub fn load(&self, key: &str) -> Option<DailyStatus> {
        let path = self.path(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read status file");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unparsable status file, ignoring");
                None
            }
        }
    }

    /// Overwrite the record for a service, creating the directory if needed.
    pub fn save(&self, key: &str, record: &DailyStatus) {
        let path = self.path(key);
        if let Err(err) = self.write(&path, record) {
            error!(path = %path.display(), error = %err, "failed to save status file");
        } else {
            info!(
                path = %path.display(),
                success = record.success,
                message = %record.message,
                "status saved"
            );
        }
    }

    fn write(&self, path: &Path, record: &DailyStatus) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Gate rule: a successful record for `today` short-circuits the run.
    pub fn is_done(&self, key: &str, today: NaiveDate) -> bool {
        self.load(key)
            .is_some_and(|record| record.success && record.is_for(today))
    }
}
