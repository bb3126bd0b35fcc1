// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chanvault serve` and the one-shot Bot API commands.
//!
//! `serve` opens the SQLite store, connects to the Bot API, and runs the
//! webhook server next to a periodic reconcile loop until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use chanvault_config::model::ChanvaultConfig;
use chanvault_core::ChanvaultError;
use chanvault_engine::{Engine, replies, shutdown};
use chanvault_storage::SqliteStore;
use chanvault_telegram::TelegramGateway;
use chanvault_webhook::{HealthState, WebhookState};

/// How long background jobs get to finish after the server stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

type RenderFn = Arc<dyn Fn() -> String + Send + Sync>;

#[cfg(feature = "prometheus")]
fn metrics_render(config: &ChanvaultConfig) -> Result<Option<RenderFn>, ChanvaultError> {
    if !config.metrics.enabled {
        info!("metrics disabled");
        return Ok(None);
    }
    let exporter = chanvault_prometheus::PrometheusExporter::install()?;
    Ok(Some(Arc::new(move || exporter.render())))
}

#[cfg(not(feature = "prometheus"))]
fn metrics_render(config: &ChanvaultConfig) -> Result<Option<RenderFn>, ChanvaultError> {
    if config.metrics.enabled {
        warn!("metrics enabled in config but the prometheus feature is not compiled in");
    }
    Ok(None)
}

/// Run the `chanvault serve` command.
pub async fn run_serve(config: ChanvaultConfig) -> Result<(), ChanvaultError> {
    // A missing token must fail before the database file is created.
    let gateway = Arc::new(TelegramGateway::new(&config.bot)?);
    let store = Arc::new(SqliteStore::open(&config.storage).await?);

    match gateway.get_me().await {
        Ok(me) => info!(bot_id = me.id, username = ?me.username, "connected to Bot API"),
        Err(e) => warn!(error = %e, "Bot API not reachable yet, continuing"),
    }

    let prometheus_render = metrics_render(&config)?;
    let engine = Engine::new(store.clone(), gateway, &config);
    let cancel = shutdown::install_signal_handler();

    if config.reconcile.enabled {
        let loop_engine = engine.clone();
        let loop_cancel = cancel.clone();
        let interval_secs = config.reconcile.interval_secs;

        engine.tasks().spawn("reconcile-loop", async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // Skip the first immediate tick.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = loop_engine.reconcile_all().await {
                            warn!(error = %e, "reconciliation sweep failed (non-fatal)");
                        }
                    }
                    _ = loop_cancel.cancelled() => {
                        info!("reconcile loop shutting down");
                        break;
                    }
                }
            }
        });
        info!(interval_secs, "periodic reconciliation enabled");
    } else {
        info!("periodic reconciliation disabled");
    }

    let state = WebhookState {
        engine: engine.clone(),
        secret_token: config.server.secret_token.clone(),
        health: HealthState::new(prometheus_render),
    };
    let served = chanvault_webhook::start_server(&config.server, state, cancel.clone()).await;
    // Stop the reconcile loop even when the server failed to start.
    cancel.cancel();

    shutdown::drain_jobs(engine.tasks(), DRAIN_TIMEOUT).await;
    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to checkpoint database on shutdown");
    }
    served?;

    info!("chanvault serve shutdown complete");
    Ok(())
}

/// Run the `chanvault reconcile` command: one sweep, then exit.
pub async fn run_reconcile(config: ChanvaultConfig) -> Result<(), ChanvaultError> {
    let gateway = Arc::new(TelegramGateway::new(&config.bot)?);
    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    let engine = Engine::new(store.clone(), gateway, &config);

    let report = engine.reconcile_all().await;
    store.close().await?;
    println!("{}", replies::reconcile_summary(&report?));
    Ok(())
}

/// Run the `chanvault set-webhook` command.
pub async fn set_webhook(config: &ChanvaultConfig, url: &str) -> Result<(), ChanvaultError> {
    if !url.starts_with("https://") {
        return Err(ChanvaultError::InvalidInput(format!(
            "webhook URL must use https: {url}"
        )));
    }
    let gateway = TelegramGateway::new(&config.bot)?;
    gateway
        .set_webhook(url, config.server.secret_token.as_deref())
        .await?;
    println!("webhook set to {url}");
    Ok(())
}

/// Run the `chanvault delete-webhook` command.
pub async fn delete_webhook(config: &ChanvaultConfig) -> Result<(), ChanvaultError> {
    TelegramGateway::new(&config.bot)?.delete_webhook().await?;
    println!("webhook removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_webhook_rejects_plain_http() {
        let config = ChanvaultConfig::default();
        let err = set_webhook(&config, "http://example.com/webhook")
            .await
            .unwrap_err();
        assert!(matches!(err, ChanvaultError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn commands_need_a_bot_token() {
        let config = ChanvaultConfig::default();
        let err = delete_webhook(&config).await.unwrap_err();
        assert!(matches!(err, ChanvaultError::Config(_)));
    }

    #[tokio::test]
    async fn missing_token_leaves_no_database_behind() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("chanvault.db");
        let mut config = ChanvaultConfig::default();
        config.storage.database_path = db_path.display().to_string();

        let err = run_reconcile(config.clone()).await.unwrap_err();
        assert!(matches!(err, ChanvaultError::Config(_)));
        let err = run_serve(config).await.unwrap_err();
        assert!(matches!(err, ChanvaultError::Config(_)));

        assert!(!db_path.exists());
    }
}
