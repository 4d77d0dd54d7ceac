// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq doctor` command implementation.
//!
//! Runs diagnostic checks against the configured backend.

use std::time::{Duration, Instant};

use colored::Colorize;
use souq_config::model::{BackendKind, SouqConfig};
use souq_core::{HealthStatus, SouqError};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

fn check_config(config: &SouqConfig) -> CheckResult {
    let start = Instant::now();
    let backend = match config.backend.kind {
        BackendKind::Local => format!("local ({})", config.backend.local.database_path),
        BackendKind::Hosted => format!(
            "hosted ({})",
            config.backend.hosted.base_url.as_deref().unwrap_or("-")
        ),
    };
    CheckResult {
        name: "config".into(),
        status: CheckStatus::Pass,
        message: format!("valid, backend {backend}"),
        duration: start.elapsed(),
    }
}

async fn check_backend(config: &SouqConfig) -> CheckResult {
    let start = Instant::now();
    let (status, message) = match souq_support::open_backend(config).await {
        Ok(backend) => {
            let health = backend.health_check().await;
            let _ = backend.shutdown().await;
            match health {
                Ok(HealthStatus::Healthy) => (CheckStatus::Pass, format!("{} backend healthy", backend.name())),
                Ok(HealthStatus::Degraded(msg)) => (CheckStatus::Warn, format!("degraded: {msg}")),
                Ok(HealthStatus::Unhealthy(msg)) => (CheckStatus::Fail, format!("unhealthy: {msg}")),
                Err(e) => (CheckStatus::Fail, e.to_string()),
            }
        }
        Err(e) => (CheckStatus::Fail, format!("cannot open backend: {e}")),
    };
    CheckResult {
        name: "backend".into(),
        status,
        message,
        duration: start.elapsed(),
    }
}

fn check_poll_interval(config: &SouqConfig) -> CheckResult {
    let secs = config.chat.poll_interval_secs;
    let (status, message) = if secs > 60 {
        (CheckStatus::Warn, format!("{secs}s, new messages will appear slowly"))
    } else {
        (CheckStatus::Pass, format!("{secs}s"))
    };
    CheckResult {
        name: "poll interval".into(),
        status,
        message,
        duration: Duration::ZERO,
    }
}

/// Run all checks; returns an error if any check failed.
pub async fn run_doctor(config: &SouqConfig, use_color: bool) -> Result<(), SouqError> {
    let results = vec![
        check_config(config),
        check_backend(config).await,
        check_poll_interval(config),
    ];

    println!();
    println!("  souq doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        let duration_ms = result.duration.as_millis();
        let (symbol, message) = match (&result.status, use_color) {
            (CheckStatus::Pass, true) => ("✓".green().to_string(), result.message.clone()),
            (CheckStatus::Pass, false) => ("[OK]  ".to_string(), result.message.clone()),
            (CheckStatus::Warn, true) => ("!".yellow().to_string(), result.message.yellow().to_string()),
            (CheckStatus::Warn, false) => ("[WARN]".to_string(), result.message.clone()),
            (CheckStatus::Fail, true) => ("✗".red().to_string(), result.message.red().to_string()),
            (CheckStatus::Fail, false) => ("[FAIL]".to_string(), result.message.clone()),
        };
        match result.status {
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
            CheckStatus::Pass => {}
        }
        println!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name);
    }
    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }

    if fail_count > 0 {
        return Err(SouqError::Internal(format!("{fail_count} doctor check(s) failed")));
    }
    Ok(())
}
