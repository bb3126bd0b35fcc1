// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-over-HTTPS client for the Bot API.
//!
//! Every method is a `POST {api_url}/bot{token}/{method}` with a JSON body.
//! Responses share one envelope: `{ok, result, description, error_code}`.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use chanvault_config::model::BotConfig;
use chanvault_core::ChanvaultError;

/// Response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// Bot API RPC client.
///
/// The token lives only inside `endpoint` and is never logged: `Debug`
/// redacts it and transport errors are stripped of their URL.
#[derive(Clone)]
pub struct BotApi {
    client: reqwest::Client,
    endpoint: String,
}

impl fmt::Debug for BotApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotApi")
            .field("endpoint", &"<redacted>")
            .finish()
    }
}

impl BotApi {
    /// Builds a client from `[bot]` configuration. A missing or empty token
    /// is a configuration error.
    pub fn new(config: &BotConfig) -> Result<Self, ChanvaultError> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ChanvaultError::Config("bot.token is required".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ChanvaultError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", config.api_url.trim_end_matches('/'), token.trim()),
        })
    }

    /// Calls `method` and decodes its `result`.
    ///
    /// Transport failures, undecodable bodies, and `ok=false` all come back
    /// as [`ChanvaultError::Gateway`].
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, ChanvaultError> {
        let started = std::time::Instant::now();
        let outcome = self.call_inner(method, body).await;
        metrics::histogram!("chanvault_gateway_call_seconds", "method" => method.to_string())
            .record(started.elapsed().as_secs_f64());
        let label = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            "chanvault_gateway_calls_total",
            "method" => method.to_string(),
            "outcome" => label
        )
        .increment(1);
        outcome
    }

    async fn call_inner<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, ChanvaultError> {
        let url = format!("{}/{method}", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(method, e))?;

        let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
            ChanvaultError::Gateway {
                method: method.to_string(),
                description: format!("undecodable response (HTTP {status})"),
                source: Some(Box::new(e)),
            }
        })?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("HTTP {status}"));
            debug!(method, error_code = ?envelope.error_code, %description, "bot api call rejected");
            return Err(ChanvaultError::gateway(method, description));
        }

        envelope
            .result
            .ok_or_else(|| ChanvaultError::gateway(method, "ok response without result"))
    }
}

fn transport_error(method: &str, err: reqwest::Error) -> ChanvaultError {
    let err = err.without_url();
    ChanvaultError::Gateway {
        method: method.to_string(),
        description: err.to_string(),
        source: Some(Box::new(err)),
    }
}
