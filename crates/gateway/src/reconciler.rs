// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`OrphanReconciler`]: periodically finds and removes containers the
//! gateway created whose owning run is no longer in the queue's active set
//! (§4.8) -- a crash or a missed finalization step leaves these behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gw_container::ContainerBackend;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::queue::JobQueue;

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub detected: usize,
    pub removed: Vec<String>,
}

pub struct OrphanReconciler {
    queue: Arc<JobQueue>,
    containers: Arc<dyn ContainerBackend>,
    interval: Duration,
    orphans_detected_count: AtomicU64,
    orphans_removed_count: AtomicU64,
}

impl OrphanReconciler {
    pub fn new(queue: Arc<JobQueue>, containers: Arc<dyn ContainerBackend>, interval: Duration) -> Self {
        Self {
            queue,
            containers,
            interval,
            orphans_detected_count: AtomicU64::new(0),
            orphans_removed_count: AtomicU64::new(0),
        }
    }

    pub fn orphans_detected_count(&self) -> u64 {
        self.orphans_detected_count.load(Ordering::Relaxed)
    }

    pub fn orphans_removed_count(&self) -> u64 {
        self.orphans_removed_count.load(Ordering::Relaxed)
    }

    /// Runs reconciliation passes on `interval` until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(self.interval) => {
                    let report = self.reconcile_once().await;
                    if report.detected > 0 {
                        info!(detected = report.detected, removed = report.removed.len(), "reconciled orphans");
                    }
                }
            }
        }
    }

    /// Lists containers the gateway owns, removes any whose `run_id` is not
    /// in the queue's active set, and returns what it found.
    pub async fn reconcile_once(&self) -> ReconcileReport {
        let containers = match self.containers.list_orchestrator_containers().await {
            Ok(containers) => containers,
            Err(err) => {
                warn!(error = %err, "failed to list orchestrator containers");
                return ReconcileReport::default();
            }
        };

        let active = self.queue.active_run_ids();
        let orphans: Vec<_> = containers
            .into_iter()
            .filter(|container| !active.iter().any(|run_id| *run_id == container.run_id))
            .collect();

        self.orphans_detected_count.fetch_add(orphans.len() as u64, Ordering::Relaxed);

        let mut removed = Vec::new();
        for orphan in &orphans {
            match self.containers.remove_force(&orphan.container_id).await {
                Ok(()) => {
                    self.orphans_removed_count.fetch_add(1, Ordering::Relaxed);
                    removed.push(orphan.container_id.clone());
                }
                Err(err) => {
                    warn!(error = %err, container_id = %orphan.container_id, "failed to remove orphaned container");
                }
            }
        }

        ReconcileReport { detected: orphans.len(), removed }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
