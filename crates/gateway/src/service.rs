// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Service`]: the in-process `submit`/`cancel`/`subscribe` facade a
//! control-plane transport sits in front of. The wire protocol that
//! exposes these to a remote caller is out of scope here.

use std::sync::Arc;

use gw_core::{DispatchRequest, GatewayConfig, RunId};
use tokio::sync::broadcast;

use crate::error::GatewayError;
use crate::event_bus::{EventBus, JobEvent};
use crate::queue::JobQueue;

/// Label key a caller sets on [`DispatchRequest::labels`] to request a
/// specific container image; checked against the configured allow-list at
/// submission time.
pub const IMAGE_LABEL: &str = "image";

/// An [`EventBus`] that fans published events out to every live
/// subscriber via a broadcast channel. Slow subscribers lose their oldest
/// unread events rather than backing up publication.
pub struct BroadcastEventBus {
    sender: broadcast::Sender<JobEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: JobEvent) {
        // No live subscribers is not an error; the event is simply unread.
        let _ = self.sender.send(event);
    }
}

pub struct Service {
    config: GatewayConfig,
    queue: Arc<JobQueue>,
    events: Arc<BroadcastEventBus>,
}

impl Service {
    pub fn new(config: GatewayConfig, queue: Arc<JobQueue>, events: Arc<BroadcastEventBus>) -> Self {
        Self { config, queue, events }
    }

    pub fn event_bus(&self) -> Arc<dyn EventBus> {
        self.events.clone()
    }

    /// Admits `request`, checking the image allow-list (if the request
    /// names an image) ahead of the queue's slot/duplicate checks.
    pub fn submit(&self, request: DispatchRequest) -> Result<RunId, GatewayError> {
        if let Some(image) = request.labels.get(IMAGE_LABEL) {
            if !self.config.image_allowed(image) {
                return Err(GatewayError::ImageNotAllowed { image: image.clone() });
            }
        }
        let job = self.queue.enqueue(request)?;
        Ok(*job.run_id())
    }

    /// Requests cancellation of `run_id`. Returns whether it was found in
    /// the active set; idempotent.
    pub fn cancel(&self, run_id: &RunId) -> bool {
        self.queue.cancel(run_id)
    }

    /// A fresh subscription over every job event published from this
    /// point forward.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
