// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`JobQueue`]: a slot-bounded admission queue. Admission is bounded by
//! the size of the active set rather than channel depth, so a slow
//! consumer can never mask saturation (§4.1).

use std::collections::HashMap;
use std::sync::Arc;

use gw_core::{DispatchRequest, QueuedJob, RunId};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;

/// `(run_id → cancellation handle)`, the active set. Bounded at
/// `max_slots`; a job occupies a slot from `enqueue` until `mark_completed`.
pub struct JobQueue {
    max_slots: usize,
    active: Arc<Mutex<HashMap<RunId, CancellationToken>>>,
    sender: mpsc::UnboundedSender<QueuedJob>,
    receiver: AsyncMutex<mpsc::UnboundedReceiver<QueuedJob>>,
}

impl JobQueue {
    pub fn new(max_slots: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { max_slots, active: Arc::new(Mutex::new(HashMap::new())), sender, receiver: AsyncMutex::new(receiver) }
    }

    pub fn can_accept(&self) -> bool {
        self.active.lock().len() < self.max_slots
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// The run-ids of every job currently in the active set, used by the
    /// orphan reconciler.
    pub fn active_run_ids(&self) -> Vec<RunId> {
        self.active.lock().keys().copied().collect()
    }

    /// Inserts into the active set before publishing to the channel, per
    /// the ordering the admission invariant relies on.
    pub fn enqueue(&self, request: DispatchRequest) -> Result<QueuedJob, GatewayError> {
        let run_id = request.run_id;
        let mut active = self.active.lock();
        if active.contains_key(&run_id) {
            return Err(GatewayError::Duplicate(run_id));
        }
        if active.len() >= self.max_slots {
            return Err(GatewayError::Rejected);
        }
        let job = QueuedJob::new(request);
        active.insert(run_id, job.cancellation.clone());
        drop(active);

        if self.sender.send(job.clone()).is_err() {
            self.active.lock().remove(&run_id);
            return Err(GatewayError::Rejected);
        }
        Ok(job)
    }

    /// Pops the next admitted job in FIFO order. Intended for a single
    /// caller (the processor's consumer loop); `None` once the queue's
    /// sender half has been dropped and the channel is drained.
    pub async fn recv(&self) -> Option<QueuedJob> {
        self.receiver.lock().await.recv().await
    }

    /// Signals the stored cancellation handle. Idempotent; returns whether
    /// `run_id` was found in the active set.
    pub fn cancel(&self, run_id: &RunId) -> bool {
        match self.active.lock().get(run_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Removes `run_id` from the active set. Idempotent.
    pub fn mark_completed(&self, run_id: &RunId) {
        self.active.lock().remove(run_id);
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
