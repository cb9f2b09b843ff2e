//! Wire-shape tests for the persisted status file: external schedulers and
//! humans read it, so field names and formats are load-bearing.

use chrono::Local;
use daily_checkin::session::AccountOutcome;
use daily_checkin::status::{DailyStatus, StatusStore};

#[test]
fn status_file_has_the_expected_shape() {
    let dir = tempfile::tempdir().unwrap();
    let store = StatusStore::new(dir.path().join("status"));

    let record = DailyStatus::record(
        Local::now(),
        true,
        "2 succeeded, 0 failed",
        vec![
            AccountOutcome {
                username: "al***e".to_string(),
                success: true,
                message: "check-in success, consecutive check-in 3 days".to_string(),
                credit_info: None,
            },
            AccountOutcome {
                username: "bo***b".to_string(),
                success: true,
                message: "already checked in today".to_string(),
                credit_info: Some("credits: 99".to_string()),
            },
        ],
    );
    store.save("yuchen", &record);

    let raw = std::fs::read_to_string(dir.path().join("status/status_yuchen.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let date = json["date"].as_str().unwrap();
    assert_eq!(date.len(), 10, "date must be YYYY-MM-DD, got {date}");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "2 succeeded, 0 failed");
    let ts = json["timestamp"].as_str().unwrap();
    assert_eq!(ts.len(), 19, "timestamp must be YYYY-MM-DD HH:MM:SS, got {ts}");

    let details = json["accounts_detail"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["username"], "al***e");
    // credit_info is omitted when absent, present when known
    assert!(details[0].get("credit_info").is_none());
    assert_eq!(details[1]["credit_info"], "credits: 99");
}

#[test]
fn record_without_accounts_detail_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let store = StatusStore::new(dir.path().join("status"));
    std::fs::create_dir_all(dir.path().join("status")).unwrap();
    std::fs::write(
        dir.path().join("status/status_old.json"),
        r#"{"date":"2026-08-30","success":true,"message":"done","timestamp":"2026-08-30 08:00:00"}"#,
    )
    .unwrap();

    let record = store.load("old").unwrap();
    assert!(record.accounts_detail.is_empty());
}
