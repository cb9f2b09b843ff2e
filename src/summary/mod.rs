//! Human-readable run summary: stdout banner plus the CI step-summary sink.
//!
//! Nothing here is machine-consumed; the status file is the durable record.

use std::io::Write;

use chrono::Local;
use tracing::warn;

use crate::batch::RunReport;

pub fn print_banner(service: &str) {
    println!();
    println!("{:=<60}", "");
    println!("  daily check-in: {service}");
    println!("  started: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{:=<60}", "");
}

pub fn print_report(service: &str, report: &RunReport) {
    println!();
    println!("{:=<60}", "");
    let mark = if report.overall_success() { "OK" } else { "FAILED" };
    println!("  {service}: {mark} -- {}", report.summary());
    for outcome in &report.outcomes {
        let mark = if outcome.success { "ok" } else { "fail" };
        print!("   - {} [{mark}] {}", outcome.username, outcome.message);
        if let Some(credit) = &outcome.credit_info {
            print!(" ({credit})");
        }
        println!();
    }
    println!("{:=<60}", "");
    println!();
}

/// Append a Markdown section to the CI step summary, when the runner
/// provides one (`GITHUB_STEP_SUMMARY`). Failures are logged, never fatal.
pub fn append_ci_summary(service: &str, report: &RunReport) {
    let Ok(path) = std::env::var("GITHUB_STEP_SUMMARY") else {
        return;
    };
    let markdown = render_markdown(service, report);
    let result = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .and_then(|mut file| file.write_all(markdown.as_bytes()));
    if let Err(err) = result {
        warn!(path = %path, error = %err, "failed to append CI step summary");
    }
}

fn render_markdown(service: &str, report: &RunReport) -> String {
    let emoji = if report.overall_success() { "✅" } else { "❌" };
    let mut out = format!("## {emoji} {service} check-in\n\n{}\n\n", report.summary());
    for outcome in &report.outcomes {
        let mark = if outcome.success { "✅" } else { "❌" };
        out.push_str(&format!("- {mark} `{}` {}", outcome.username, outcome.message));
        if let Some(credit) = &outcome.credit_info {
            out.push_str(&format!(" ({credit})"));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "\n**run time**: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out
}
