// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget execution of long-running jobs.
//!
//! Handlers submit discovery, restore, and reconciliation runs here and
//! return immediately. Results reach the operator only through messages the
//! job sends itself.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::metrics;

#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `job` on the runtime without waiting for it.
    ///
    /// A panicking job is logged and does not take anything else down.
    pub fn spawn<F>(&self, name: &'static str, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let tracker = self.tracker.clone();
        self.tracker.spawn(async move {
            debug!(job = name, "background job started");
            if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                error!(job = name, "background job panicked");
            } else {
                debug!(job = name, "background job finished");
            }
            // This task still counts itself until it returns.
            metrics::set_background_jobs(tracker.len().saturating_sub(1));
        });
        metrics::set_background_jobs(self.tracker.len());
    }

    /// Number of jobs still running.
    pub fn active(&self) -> usize {
        self.tracker.len()
    }

    /// Waits up to `timeout` for running jobs to finish.
    ///
    /// Returns `true` when every job completed in time. New jobs can still be
    /// submitted afterwards.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let running = self.tracker.len();
        if running > 0 {
            info!(running, "waiting for background jobs");
        }
        self.tracker.close();
        let finished = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();
        if !finished {
            warn!(remaining = self.tracker.len(), "background jobs still running after timeout");
        }
        finished
    }
}
