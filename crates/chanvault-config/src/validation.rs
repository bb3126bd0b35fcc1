// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! Every rule is evaluated; the caller receives all failures at once.

use crate::diagnostic::ConfigError;
use crate::model::ChanvaultConfig;

/// Smallest allowed reconciliation period while the sweep is enabled.
const MIN_RECONCILE_INTERVAL_SECS: u64 = 60;

/// Validate a deserialized configuration.
pub fn validate_config(config: &ChanvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::validation(
            "server.bind_address must not be empty",
        ));
    } else {
        let is_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = addr
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.bind_address `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    if !config.server.webhook_path.starts_with('/') {
        errors.push(ConfigError::validation(format!(
            "server.webhook_path must start with `/`, got `{}`",
            config.server.webhook_path
        )));
    }

    if config.bot.api_url.trim().is_empty() {
        errors.push(ConfigError::validation("bot.api_url must not be empty"));
    }

    if config.backup.max_media_bytes == 0 {
        errors.push(ConfigError::validation(
            "backup.max_media_bytes must be at least 1",
        ));
    }

    if config.discovery.upper_bound < 1 {
        errors.push(ConfigError::validation(format!(
            "discovery.upper_bound must be at least 1, got {}",
            config.discovery.upper_bound
        )));
    }

    if config.discovery.failure_cutoff == 0 {
        errors.push(ConfigError::validation(
            "discovery.failure_cutoff must be at least 1",
        ));
    }

    if config.reconcile.window < 1 {
        errors.push(ConfigError::validation(format!(
            "reconcile.window must be at least 1, got {}",
            config.reconcile.window
        )));
    }

    if config.reconcile.enabled && config.reconcile.interval_secs < MIN_RECONCILE_INTERVAL_SECS {
        errors.push(ConfigError::validation(format!(
            "reconcile.interval_secs must be at least {MIN_RECONCILE_INTERVAL_SECS}, got {}",
            config.reconcile.interval_secs
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ChanvaultConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ChanvaultConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn webhook_path_needs_leading_slash() {
        let mut config = ChanvaultConfig::default();
        config.server.webhook_path = "hook".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "webhook_path"));
    }

    #[test]
    fn zero_cutoff_and_window_are_both_reported() {
        let mut config = ChanvaultConfig::default();
        config.discovery.failure_cutoff = 0;
        config.reconcile.window = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_message(&errors, "failure_cutoff"));
        assert!(has_message(&errors, "reconcile.window"));
    }

    #[test]
    fn short_interval_only_matters_when_enabled() {
        let mut config = ChanvaultConfig::default();
        config.reconcile.interval_secs = 5;
        assert!(has_message(
            &validate_config(&config).unwrap_err(),
            "interval_secs"
        ));

        config.reconcile.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_bind_address_fails_validation() {
        let mut config = ChanvaultConfig::default();
        config.server.bind_address = "not an address!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bind_address"));
    }
}
