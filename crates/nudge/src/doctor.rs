// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nudge doctor` command implementation.
//!
//! Checks that both databases open with the configured settings and that
//! every active account can decrypt pushes.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nudge_config::NudgeConfig;
use nudge_core::{Collaborator, CredentialStore, HealthStatus, NudgeError};
use nudge_service::ActiveAccountResolver;
use nudge_storage::SqliteConversationStore;
use nudge_vault::SqliteCredentialStore;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

fn from_health(name: &str, health: Result<HealthStatus, NudgeError>, start: Instant) -> CheckResult {
    match health {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "ok", start),
        Ok(HealthStatus::Degraded(msg)) => CheckResult::new(name, CheckStatus::Warn, msg, start),
        Ok(HealthStatus::Unhealthy(msg)) => CheckResult::new(name, CheckStatus::Fail, msg, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Run all checks, print them, and return the number of failures.
pub async fn run_doctor(config: &NudgeConfig, plain: bool) -> Result<usize, NudgeError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(config).await;

    println!();
    println!("  nudge doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let fail_count = results.iter().filter(|r| r.status == CheckStatus::Fail).count();
    let warn_count = results.iter().filter(|r| r.status == CheckStatus::Warn).count();
    let issues = fail_count + warn_count;
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(fail_count)
}

async fn collect_checks(config: &NudgeConfig) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let start = Instant::now();
    results.push(CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!("valid (deadline {}ms)", config.extension.deadline_ms),
        start,
    ));

    let start = Instant::now();
    match SqliteConversationStore::open(&config.storage).await {
        Ok(store) => results.push(from_health("Chat database", store.health_check().await, start)),
        Err(e) => results.push(CheckResult::new(
            "Chat database",
            CheckStatus::Fail,
            format!("open failed: {e}"),
            start,
        )),
    }

    let start = Instant::now();
    let credentials = match SqliteCredentialStore::open_read_only(&config.vault).await {
        Ok(store) => {
            results.push(from_health("Credential store", store.health_check().await, start));
            Arc::new(store)
        }
        Err(e) => {
            results.push(CheckResult::new(
                "Credential store",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            ));
            return results;
        }
    };

    let start = Instant::now();
    let active = ActiveAccountResolver::new(credentials.clone())
        .list_active_accounts()
        .await;
    if active.is_empty() {
        results.push(CheckResult::new(
            "Active accounts",
            CheckStatus::Warn,
            "none; badge counts only known threads",
            start,
        ));
        return results;
    }
    results.push(CheckResult::new(
        "Active accounts",
        CheckStatus::Pass,
        active.len().to_string(),
        start,
    ));

    let start = Instant::now();
    let mut missing = Vec::new();
    for account in &active {
        match credentials.get_key(account).await {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => missing.push(account.to_string()),
        }
    }
    if missing.is_empty() {
        results.push(CheckResult::new("Push keys", CheckStatus::Pass, "all present", start));
    } else {
        results.push(CheckResult::new(
            "Push keys",
            CheckStatus::Warn,
            format!("missing for {}", missing.join(", ")),
            start,
        ));
    }

    results
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({duration_ms}ms)", result.name, result.message)
    }
}
