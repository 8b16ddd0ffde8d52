// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::request::DispatchRequest;

#[test]
fn cancel_is_idempotent_and_observable() {
    let job = QueuedJob::new(DispatchRequest::builder().build());
    assert!(!job.is_cancelled());
    job.cancel();
    job.cancel();
    assert!(job.is_cancelled());
}

#[test]
fn run_id_matches_the_wrapped_request() {
    let req = DispatchRequest::builder().build();
    let run_id = req.run_id;
    let job = QueuedJob::new(req);
    assert_eq!(job.run_id(), &run_id);
}

#[test]
fn clone_shares_the_same_cancellation_token() {
    let job = QueuedJob::new(DispatchRequest::builder().build());
    let cloned = job.clone();
    job.cancel();
    assert!(cloned.is_cancelled());
}
