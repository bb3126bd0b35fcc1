// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions.
//!
//! The counters themselves are recorded where the work happens (the engine
//! and the Bot API client); this only attaches help text and units.

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

/// Register all chanvault metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "chanvault_backups_saved_total",
        "Backup entries written, by provenance"
    );
    describe_counter!(
        "chanvault_backups_duplicate_total",
        "Writes skipped because the entry already existed"
    );
    describe_counter!(
        "chanvault_backups_oversized_total",
        "Posts skipped by the media size ceiling"
    );
    describe_counter!("chanvault_probes_total", "Forward probes, by outcome");
    describe_counter!("chanvault_restore_sends_total", "Restore sends, by outcome");
    describe_counter!(
        "chanvault_jobs_completed_total",
        "Finished discovery, restore, and reconcile runs"
    );
    describe_counter!(
        "chanvault_gateway_calls_total",
        "Bot API calls, by method and outcome"
    );
    describe_gauge!("chanvault_background_jobs", "Background jobs in flight");
    describe_histogram!(
        "chanvault_gateway_call_seconds",
        Unit::Seconds,
        "Bot API call latency"
    );
    describe_counter!(
        "chanvault_webhook_updates_total",
        "Webhook deliveries, by status"
    );
}
