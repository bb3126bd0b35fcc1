// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics exporter for chanvault.
//!
//! Uses the metrics-rs facade with the Prometheus exporter.
//! Metrics are rendered as Prometheus text format via the `render()` method,
//! which is exposed through the webhook server's /metrics endpoint.

pub mod recording;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use chanvault_core::ChanvaultError;

pub use recording::register_metrics;

/// Prometheus metrics exporter.
///
/// Owns a handle for rendering everything recorded through the facade.
#[derive(Clone)]
pub struct PrometheusExporter {
    handle: PrometheusHandle,
}

impl PrometheusExporter {
    /// Installs the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process. Returns an error if a
    /// recorder is already installed.
    pub fn install() -> Result<Self, ChanvaultError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            ChanvaultError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Builds an exporter without installing it globally.
    ///
    /// The returned recorder must be installed (or scoped with
    /// `metrics::with_local_recorder`) for anything to be collected.
    pub fn detached() -> (Self, PrometheusRecorder) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        (Self { handle }, recorder)
    }

    /// Get a reference to the Prometheus handle for rendering.
    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_exporter_renders_recorded_counters() {
        let (exporter, recorder) = PrometheusExporter::detached();
        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            metrics::counter!("chanvault_backups_saved_total", "provenance" => "auto")
                .increment(2);
        });

        let text = exporter.render();
        assert!(text.contains("chanvault_backups_saved_total{provenance=\"auto\"} 2"));
        assert!(text.contains("# HELP chanvault_backups_saved_total"));
    }

    #[test]
    fn nothing_recorded_renders_empty() {
        let (exporter, _recorder) = PrometheusExporter::detached();
        assert!(exporter.render().trim().is_empty());
    }
}
