// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! chanvault - channel backup and restore bot.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chanvault_config::ChanvaultConfig;

/// chanvault - back up channels and replay them elsewhere.
#[derive(Parser, Debug)]
#[command(name = "chanvault", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook server and the periodic reconciler.
    Serve,
    /// Run one reconciliation sweep and exit.
    Reconcile,
    /// Register the webhook URL with the Bot API.
    SetWebhook {
        /// Public HTTPS URL, including the webhook path.
        url: String,
    },
    /// Remove the registered webhook.
    DeleteWebhook,
    /// Check configuration, database, and bot connectivity.
    Check,
}

fn load(path: Option<&PathBuf>) -> ChanvaultConfig {
    let loaded = match path {
        Some(path) => chanvault_config::load_and_validate_path(path),
        None => chanvault_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            chanvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chanvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("chanvault: use --help for available commands");
        return;
    };

    let config = load(cli.config.as_ref());
    init_tracing(&config.log.level);

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Reconcile => serve::run_reconcile(config).await,
        Commands::SetWebhook { url } => serve::set_webhook(&config, &url).await,
        Commands::DeleteWebhook => serve::delete_webhook(&config).await,
        Commands::Check => match check::run_check(&config).await {
            Ok(true) => Ok(()),
            Ok(false) => std::process::exit(1),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("chanvault: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["chanvault", "--config", "/tmp/c.toml", "set-webhook", "https://x/hook"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Some(Commands::SetWebhook { url }) if url == "https://x/hook"));

        let cli = Cli::try_parse_from(["chanvault", "reconcile"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Reconcile)));
    }

    #[test]
    fn set_webhook_requires_url() {
        assert!(Cli::try_parse_from(["chanvault", "set-webhook"]).is_err());
    }

    #[test]
    fn inline_defaults_are_valid() {
        let config = chanvault_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.server.webhook_path, "/webhook");
    }
}
