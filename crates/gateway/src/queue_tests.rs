// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use gw_core::{ArtifactPolicy, DispatchRequest, ExecutionMode, RepositoryId, RunId, SandboxProfile, TaskId};

use super::*;

fn request() -> DispatchRequest {
    DispatchRequest {
        run_id: RunId::new(),
        task_id: TaskId::new(),
        repository_id: RepositoryId::new(),
        harness: "generic".to_string(),
        mode: ExecutionMode::Default,
        prompt: "echo hi".to_string(),
        multimodal_parts: Vec::new(),
        custom_command: None,
        timeout_seconds: None,
        clone_url: None,
        branch: None,
        env: HashMap::new(),
        labels: HashMap::new(),
        sandbox: SandboxProfile::default(),
        artifact_policy: ArtifactPolicy::default(),
        structured_protocol_version: None,
    }
}

#[test]
fn can_accept_reflects_active_set_size_not_channel_depth() {
    let queue = JobQueue::new(2);
    assert!(queue.can_accept());
    queue.enqueue(request()).unwrap();
    assert!(queue.can_accept());
    queue.enqueue(request()).unwrap();
    assert!(!queue.can_accept());
}

#[test]
fn enqueue_rejects_once_full() {
    let queue = JobQueue::new(1);
    queue.enqueue(request()).unwrap();
    let err = queue.enqueue(request()).unwrap_err();
    assert!(matches!(err, GatewayError::Rejected));
}

#[test]
fn enqueue_rejects_duplicate_run_id() {
    let queue = JobQueue::new(4);
    let req = request();
    let run_id = req.run_id;
    queue.enqueue(req.clone()).unwrap();
    let mut dup = req;
    dup.run_id = run_id;
    let err = queue.enqueue(dup).unwrap_err();
    assert!(matches!(err, GatewayError::Duplicate(_)));
}

#[tokio::test]
async fn recv_yields_jobs_in_fifo_order() {
    let queue = JobQueue::new(4);
    let first = queue.enqueue(request()).unwrap();
    let second = queue.enqueue(request()).unwrap();

    let popped_first = queue.recv().await.unwrap();
    let popped_second = queue.recv().await.unwrap();
    assert_eq!(popped_first.run_id(), first.run_id());
    assert_eq!(popped_second.run_id(), second.run_id());
}

#[test]
fn cancel_is_idempotent_and_reports_whether_the_id_was_active() {
    let queue = JobQueue::new(4);
    let job = queue.enqueue(request()).unwrap();
    assert!(queue.cancel(job.run_id()));
    assert!(job.is_cancelled());
    assert!(queue.cancel(job.run_id()));
    assert!(!queue.cancel(&gw_core::RunId::new()));
}

#[test]
fn mark_completed_frees_the_slot() {
    let queue = JobQueue::new(1);
    let job = queue.enqueue(request()).unwrap();
    assert!(!queue.can_accept());
    queue.mark_completed(job.run_id());
    assert!(queue.can_accept());
}
