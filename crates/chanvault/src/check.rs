// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chanvault check` command implementation.
//!
//! Runs quick checks against the configured database and Bot API so a bad
//! deployment is caught before the webhook is registered.

use std::time::{Duration, Instant};

use chanvault_config::model::ChanvaultConfig;
use chanvault_core::ChanvaultError;
use chanvault_storage::SqliteStore;
use chanvault_telegram::TelegramGateway;

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

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, started: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: started.elapsed(),
        }
    }
}

/// Run the `chanvault check` command.
///
/// Returns `Ok(false)` when any check failed.
pub async fn run_check(config: &ChanvaultConfig) -> Result<bool, ChanvaultError> {
    let results = vec![
        CheckResult::new("config", CheckStatus::Pass, "valid", Instant::now()),
        check_database(config).await,
        check_bot(config).await,
        check_webhook(config),
    ];

    println!();
    println!("  chanvault check");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result));
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        let word = if failed == 1 { "check" } else { "checks" };
        println!("  {failed} {word} failed.");
    } else {
        println!("  All checks passed.");
    }
    Ok(failed == 0)
}

fn format_line(result: &CheckResult) -> String {
    let tag = match result.status {
        CheckStatus::Pass => "[OK]  ",
        CheckStatus::Warn => "[WARN]",
        CheckStatus::Fail => "[FAIL]",
    };
    format!(
        "    {tag} {:<12} {} ({}ms)",
        result.name,
        result.message,
        result.duration.as_millis()
    )
}

async fn check_database(config: &ChanvaultConfig) -> CheckResult {
    let started = Instant::now();
    let outcome = async {
        let store = SqliteStore::open(&config.storage).await?;
        store.ping().await?;
        store.close().await
    }
    .await;
    match outcome {
        Ok(()) => CheckResult::new(
            "database",
            CheckStatus::Pass,
            config.storage.database_path.clone(),
            started,
        ),
        Err(e) => CheckResult::new("database", CheckStatus::Fail, e.to_string(), started),
    }
}

async fn check_bot(config: &ChanvaultConfig) -> CheckResult {
    let started = Instant::now();
    let gateway = match TelegramGateway::new(&config.bot) {
        Ok(gateway) => gateway,
        Err(e) => return CheckResult::new("bot", CheckStatus::Fail, e.to_string(), started),
    };
    match gateway.get_me().await {
        Ok(me) => {
            let name = me
                .username
                .map(|u| format!("@{u}"))
                .unwrap_or_else(|| me.id.to_string());
            CheckResult::new("bot", CheckStatus::Pass, format!("authenticated as {name}"), started)
        }
        Err(e) => CheckResult::new("bot", CheckStatus::Fail, e.to_string(), started),
    }
}

fn check_webhook(config: &ChanvaultConfig) -> CheckResult {
    let started = Instant::now();
    let endpoint = format!(
        "{}:{}{}",
        config.server.bind_address, config.server.port, config.server.webhook_path
    );
    if config.server.secret_token.is_none() {
        return CheckResult::new(
            "webhook",
            CheckStatus::Warn,
            format!("{endpoint} (no secret token, deliveries are not verified)"),
            started,
        );
    }
    CheckResult::new("webhook", CheckStatus::Pass, endpoint, started)
}
