// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`QueuedJob`]: a request paired with the handle used to cancel it.

use tokio_util::sync::CancellationToken;

use crate::ids::RunId;
use crate::request::DispatchRequest;

/// `(DispatchRequest, cancellation handle)`, unique by `run_id`.
///
/// The queue owns one of these per admitted job; the handle is a
/// [`CancellationToken`] so both the queue's `cancel(run_id)` and the
/// per-job timeout deadline can trigger the same cancellation.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub request: DispatchRequest,
    pub cancellation: CancellationToken,
}

impl QueuedJob {
    pub fn new(request: DispatchRequest) -> Self {
        Self { request, cancellation: CancellationToken::new() }
    }

    pub fn run_id(&self) -> &RunId {
        &self.request.run_id
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
#[path = "queued_job_tests.rs"]
mod tests;
