// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`JobProcessor`]: the long-running consumer that drains [`JobQueue`],
//! runs one [`HarnessExecutor`] per job on its own task, and turns runtime
//! chunks and terminal envelopes into published [`JobEvent`]s (§4.2).

use std::sync::Arc;
use std::time::Duration;

use gw_core::{Clock, QueuedJob, RunId, SystemClock};
use gw_wire::{project, WireEnvelope};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::event_bus::{EventBus, JobEvent};
use crate::executor::HarnessExecutor;
use crate::queue::JobQueue;

pub struct JobProcessor<C: Clock = SystemClock> {
    queue: Arc<JobQueue>,
    executor: Arc<HarnessExecutor>,
    events: Arc<dyn EventBus>,
    shutdown_timeout: Duration,
    shutdown: CancellationToken,
    clock: C,
}

impl<C: Clock + 'static> JobProcessor<C> {
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<HarnessExecutor>,
        events: Arc<dyn EventBus>,
        shutdown_timeout: Duration,
        clock: C,
    ) -> Self {
        Self { queue, executor, events, shutdown_timeout, shutdown: CancellationToken::new(), clock }
    }

    /// A handle the owning service can call `.cancel()` on to begin a
    /// graceful shutdown of this processor's consumer loop.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Consumes jobs until the queue's sender is dropped or shutdown is
    /// requested, then waits up to `shutdown_timeout` for in-flight jobs to
    /// finish before returning.
    pub async fn run(self: Arc<Self>) {
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                job = self.queue.recv() => match job {
                    Some(job) => {
                        let this = self.clone();
                        in_flight.push(tokio::spawn(async move { this.process_job(job).await }));
                    }
                    None => break,
                },
            }
        }

        let drain = async {
            for handle in in_flight {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(self.shutdown_timeout, drain).await.is_err() {
            warn!("shutdown timeout elapsed with jobs still in flight");
        }
    }

    async fn process_job(&self, job: QueuedJob) {
        let run_id = *job.run_id();
        self.events.publish(JobEvent::log(run_id, "Job started", self.now_ms()));

        let events = self.events.clone();
        let structured_version = job.request.structured_protocol_version.clone();
        let clock = self.clock.clone();
        let on_chunk: Arc<dyn Fn(Vec<u8>) + Send + Sync> = Arc::new(move |bytes: Vec<u8>| {
            publish_chunk(&events, run_id, &bytes, structured_version.as_deref(), clock.epoch_ms());
        });

        let envelope = self.executor.execute(&job, on_chunk).await;
        info!(run_id = %run_id, status = %envelope.status, "publishing completion");
        let payload = serde_json::to_value(&envelope).unwrap_or(serde_json::Value::Null);
        self.events.publish(JobEvent::completed(run_id, payload, self.now_ms()));
        self.queue.mark_completed(&run_id);
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}

/// Classifies one chunk emitted by a runtime: a well-formed [`WireEnvelope`]
/// is projected into a canonical category; anything else is surfaced as an
/// opaque log line rather than dropped.
fn publish_chunk(
    events: &Arc<dyn EventBus>,
    run_id: RunId,
    bytes: &[u8],
    structured_version: Option<&str>,
    now_ms: u64,
) {
    match WireEnvelope::from_json_bytes(bytes) {
        Ok(envelope) if envelope.is_well_formed() => {
            let projection = project(&envelope.event_type, &envelope.content, structured_version);
            events.publish(JobEvent::log_chunk(run_id, envelope.sequence, &projection, now_ms));
        }
        _ => {
            let raw = String::from_utf8_lossy(bytes).to_string();
            events.publish(JobEvent::opaque_chunk(run_id, raw, now_ms));
        }
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
