// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Heartbeat`]: after a warmup delay, periodically publishes this
//! runtime's occupancy to the control plane (§4.9).

use std::sync::Arc;
use std::time::Duration;

use gw_core::Clock;
use tokio_util::sync::CancellationToken;

use crate::queue::JobQueue;

/// One heartbeat sample.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatSample {
    pub runtime_id: String,
    pub state: &'static str,
    pub active_slots: usize,
    pub max_slots: usize,
    pub timestamp_ms: u64,
}

/// Receives published heartbeat samples.
pub trait HeartbeatSink: Send + Sync {
    fn publish(&self, sample: HeartbeatSample);
}

pub struct Heartbeat<C: Clock> {
    runtime_id: String,
    queue: Arc<JobQueue>,
    sink: Arc<dyn HeartbeatSink>,
    clock: C,
    interval: Duration,
    warmup: Duration,
}

impl<C: Clock> Heartbeat<C> {
    pub fn new(
        runtime_id: impl Into<String>,
        queue: Arc<JobQueue>,
        sink: Arc<dyn HeartbeatSink>,
        clock: C,
        interval: Duration,
        warmup: Duration,
    ) -> Self {
        Self { runtime_id: runtime_id.into(), queue, sink, clock, interval, warmup }
    }

    /// Waits out `warmup`, then publishes a sample every `interval` until
    /// `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(self.warmup) => {}
        }

        loop {
            self.publish_once();
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    pub fn publish_once(&self) {
        self.sink.publish(HeartbeatSample {
            runtime_id: self.runtime_id.clone(),
            state: "healthy",
            active_slots: self.queue.active_count(),
            max_slots: self.queue.max_slots(),
            timestamp_ms: self.clock.epoch_ms(),
        });
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
