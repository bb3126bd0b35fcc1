// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording helpers for engine metrics.
//!
//! Uses the metrics facade; with no recorder installed every call is a no-op.

use chanvault_core::Provenance;

/// Record a newly written backup entry.
pub fn record_saved(provenance: Provenance) {
    metrics::counter!("chanvault_backups_saved_total", "provenance" => provenance.to_string())
        .increment(1);
}

/// Record a write skipped because the entry already existed.
pub fn record_duplicate() {
    metrics::counter!("chanvault_backups_duplicate_total").increment(1);
}

/// Record a live post skipped by the media size ceiling.
pub fn record_oversized() {
    metrics::counter!("chanvault_backups_oversized_total").increment(1);
}

/// Record one existence probe.
pub fn record_probe(found: bool) {
    let outcome = if found { "found" } else { "missing" };
    metrics::counter!("chanvault_probes_total", "outcome" => outcome).increment(1);
}

/// Record one restore send.
pub fn record_restore_send(ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    metrics::counter!("chanvault_restore_sends_total", "outcome" => outcome).increment(1);
}

/// Record a finished long-running job.
pub fn record_job(kind: &'static str) {
    metrics::counter!("chanvault_jobs_completed_total", "kind" => kind).increment(1);
}

/// Set the number of in-flight background jobs.
pub fn set_background_jobs(count: usize) {
    metrics::gauge!("chanvault_background_jobs").set(count as f64);
}
