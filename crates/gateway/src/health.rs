// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`HealthMonitor`]: pings the container daemon on a fixed cadence and
//! reports staleness if no ping has succeeded recently enough (§4.9).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gw_container::ContainerBackend;
use gw_core::Clock;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Outcome of one liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// No ping has succeeded within `health_stale_after`.
    Stale,
}

pub struct HealthMonitor<C: Clock> {
    containers: Arc<dyn ContainerBackend>,
    clock: C,
    ping_interval: Duration,
    ping_deadline: Duration,
    stale_after: Duration,
    last_success_ms: AtomicU64,
}

impl<C: Clock> HealthMonitor<C> {
    pub fn new(
        containers: Arc<dyn ContainerBackend>,
        clock: C,
        ping_interval: Duration,
        ping_deadline: Duration,
        stale_after: Duration,
    ) -> Self {
        let last_success_ms = AtomicU64::new(clock.epoch_ms());
        Self { containers, clock, ping_interval, ping_deadline, stale_after, last_success_ms }
    }

    /// Pings on `ping_interval` until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(self.ping_interval) => {
                    self.ping_once().await;
                }
            }
        }
    }

    /// Issues one ping with `ping_deadline` applied, updating the
    /// last-success timestamp on success.
    pub async fn ping_once(&self) {
        match tokio::time::timeout(self.ping_deadline, self.containers.ping()).await {
            Ok(Ok(())) => {
                self.last_success_ms.store(self.clock.epoch_ms(), Ordering::Relaxed);
            }
            Ok(Err(err)) => warn!(error = %err, "container daemon ping failed"),
            Err(_) => warn!("container daemon ping exceeded its deadline"),
        }
    }

    /// Current status derived from the clock's notion of "now" against the
    /// last successful ping.
    pub fn status(&self) -> HealthStatus {
        let now = self.clock.epoch_ms();
        let last = self.last_success_ms.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);
        if elapsed > self.stale_after.as_millis() as u64 {
            HealthStatus::Stale
        } else {
            HealthStatus::Healthy
        }
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
