// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the webhook server.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use chanvault_config::model::ServerConfig;
use chanvault_core::ChanvaultError;
use chanvault_engine::Engine;

use crate::handlers;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render,
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub engine: Engine,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` value, if one was set
    /// when registering the webhook.
    pub secret_token: Option<String>,
    pub health: HealthState,
}

/// Builds the router: `POST {webhook_path}`, `GET /health`, `GET /metrics`.
pub fn router(state: WebhookState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handlers::post_update))
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook server.
///
/// Binds to the configured address and serves until `shutdown` is
/// cancelled. In-flight requests finish before this returns.
pub async fn start_server(
    config: &ServerConfig,
    state: WebhookState,
    shutdown: CancellationToken,
) -> Result<(), ChanvaultError> {
    let app = router(state, &config.webhook_path);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChanvaultError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, path = %config.webhook_path, "webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ChanvaultError::Internal(format!("webhook server error: {e}")))?;

    Ok(())
}
