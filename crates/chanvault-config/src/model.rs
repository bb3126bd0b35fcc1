// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for chanvault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level chanvault configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChanvaultConfig {
    #[serde(default)]
    pub log: LogConfig,

    /// Chat platform bot credentials and API endpoint.
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Live post recording settings.
    #[serde(default)]
    pub backup: BackupConfig,

    /// History discovery scan settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub restore: RestoreConfig,

    /// Periodic reconciliation settings.
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bot credential and platform endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Bot API token. Required by every command that talks to the platform.
    #[serde(default)]
    pub token: Option<String>,

    /// Base URL of the Bot API. The token is appended as `/bot<token>/<method>`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding the key-value store.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("chanvault").join("chanvault.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chanvault.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Webhook server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the platform POSTs updates to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Expected value of the `X-Telegram-Bot-Api-Secret-Token` header.
    /// `None` accepts every delivery.
    #[serde(default)]
    pub secret_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            webhook_path: default_webhook_path(),
            secret_token: None,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

/// Live channel post recording.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Posts with any attachment larger than this are skipped.
    #[serde(default = "default_max_media_bytes")]
    pub max_media_bytes: u64,

    /// Message channel owners when a new post is recorded.
    #[serde(default = "default_true")]
    pub notify_owners: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            max_media_bytes: default_max_media_bytes(),
            notify_owners: true,
        }
    }
}

fn default_max_media_bytes() -> u64 {
    25 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

/// Backward history scan run when a channel is registered.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Estimated highest message id. The scan starts here.
    #[serde(default = "default_upper_bound")]
    pub upper_bound: i64,

    /// Consecutive probe failures that end the scan.
    #[serde(default = "default_failure_cutoff")]
    pub failure_cutoff: u32,

    #[serde(default = "default_probe_delay_ms")]
    pub probe_delay_ms: u64,

    /// Publish progress after this many newly saved messages.
    #[serde(default = "default_discovery_progress_every")]
    pub progress_every: u64,

    /// Publish progress at least this often.
    #[serde(default = "default_discovery_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            upper_bound: default_upper_bound(),
            failure_cutoff: default_failure_cutoff(),
            probe_delay_ms: default_probe_delay_ms(),
            progress_every: default_discovery_progress_every(),
            progress_interval_secs: default_discovery_progress_interval_secs(),
        }
    }
}

fn default_upper_bound() -> i64 {
    10_000
}

fn default_failure_cutoff() -> u32 {
    50
}

fn default_probe_delay_ms() -> u64 {
    300
}

fn default_discovery_progress_every() -> u64 {
    20
}

fn default_discovery_progress_interval_secs() -> u64 {
    10
}

/// Replay of stored entries into a destination channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreConfig {
    /// Minimum delay between two sends.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,

    #[serde(default = "default_restore_progress_every")]
    pub progress_every: u64,

    #[serde(default = "default_restore_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: default_send_delay_ms(),
            progress_every: default_restore_progress_every(),
            progress_interval_secs: default_restore_progress_interval_secs(),
        }
    }
}

fn default_send_delay_ms() -> u64 {
    1000
}

fn default_restore_progress_every() -> u64 {
    10
}

fn default_restore_progress_interval_secs() -> u64 {
    5
}

/// Periodic catch-up sweep over every registered channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Run the sweep on a timer while serving.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Number of ids probed above the latest known backup.
    #[serde(default = "default_window")]
    pub window: i64,

    #[serde(default = "default_probe_delay_ms")]
    pub probe_delay_ms: u64,

    /// Pause between two channels.
    #[serde(default = "default_channel_delay_ms")]
    pub channel_delay_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            window: default_window(),
            probe_delay_ms: default_probe_delay_ms(),
            channel_delay_ms: default_channel_delay_ms(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_window() -> i64 {
    100
}

fn default_channel_delay_ms() -> u64 {
    1000
}

/// Prometheus metrics exposure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Serve `/metrics` on the webhook server.
    #[serde(default)]
    pub enabled: bool,
}
