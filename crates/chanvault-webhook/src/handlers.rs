// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook server.
//!
//! Handles POST {webhook_path}, GET /health, GET /metrics.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use chanvault_telegram::{parse_update, to_event};

use crate::server::WebhookState;

/// Header the Bot API sets when a secret token was given to `setWebhook`.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
}

fn record(status: &'static str) {
    metrics::counter!("chanvault_webhook_updates_total", "status" => status).increment(1);
}

/// POST {webhook_path}
///
/// Verifies the secret token, decodes the update, and hands it to the
/// engine. Unsupported update kinds are acknowledged with 200 so the
/// platform does not retry them.
pub async fn post_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(expected) = state.secret_token.as_deref() {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!("rejecting webhook delivery with bad secret token");
            record("unauthorized");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting undecodable webhook delivery");
            record("bad_request");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::debug!(update_id = update.id.0, "webhook update received");
    state.engine.handle_event(to_event(&update)).await;
    record("ok");
    StatusCode::OK
}

/// GET /health
pub async fn get_health(State(state): State<WebhookState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Renders Prometheus text format, or 404 when metrics are disabled.
pub async fn get_metrics(State(state): State<WebhookState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
