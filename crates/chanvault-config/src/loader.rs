// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order, later sources winning: compiled defaults,
//! `/etc/chanvault/chanvault.toml`, `~/.config/chanvault/chanvault.toml`,
//! `./chanvault.toml`, then `CHANVAULT_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ChanvaultConfig;

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "log",
    "bot",
    "storage",
    "server",
    "backup",
    "discovery",
    "restore",
    "reconcile",
    "metrics",
];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/chanvault/chanvault.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "chanvault.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chanvault").join("chanvault.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ChanvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<ChanvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChanvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChanvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChanvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the unextracted Figment so callers can inspect provenance metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ChanvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `CHANVAULT_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `CHANVAULT_DISCOVERY_FAILURE_CUTOFF` maps to `discovery.failure_cutoff`.
fn env_provider() -> Env {
    Env::prefixed("CHANVAULT_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_first_underscore_only() {
        assert_eq!(map_env_key("bot_token"), "bot.token");
        assert_eq!(
            map_env_key("discovery_failure_cutoff"),
            "discovery.failure_cutoff"
        );
        assert_eq!(map_env_key("server_webhook_path"), "server.webhook_path");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("telemetry_level"), "telemetry_level");
    }

    #[test]
    fn env_override_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                "[bot]\ntoken = \"from-file\"\n[reconcile]\nwindow = 5\n",
            )?;
            jail.set_env("CHANVAULT_BOT_TOKEN", "from-env");
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.bot.token.as_deref(), Some("from-env"));
            assert_eq!(config.reconcile.window, 5);
            Ok(())
        });
    }
}
