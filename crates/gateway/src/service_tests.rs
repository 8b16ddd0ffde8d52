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

fn service(config: GatewayConfig) -> Service {
    Service::new(config, Arc::new(JobQueue::new(4)), Arc::new(BroadcastEventBus::new(16)))
}

#[test]
fn submit_admits_a_request_with_no_image_label() {
    let svc = service(GatewayConfig::default());
    assert!(svc.submit(request()).is_ok());
}

#[test]
fn submit_rejects_an_image_outside_the_allow_list() {
    let mut config = GatewayConfig::default();
    config.image_allow_list = Some(vec!["registry.internal/harness-*".to_string()]);
    let svc = service(config);

    let mut req = request();
    req.labels.insert(IMAGE_LABEL.to_string(), "docker.io/library/ubuntu".to_string());

    let err = svc.submit(req).unwrap_err();
    assert!(matches!(err, GatewayError::ImageNotAllowed { .. }));
}

#[test]
fn submit_admits_an_image_matching_the_allow_list() {
    let mut config = GatewayConfig::default();
    config.image_allow_list = Some(vec!["registry.internal/harness-*".to_string()]);
    let svc = service(config);

    let mut req = request();
    req.labels.insert(IMAGE_LABEL.to_string(), "registry.internal/harness-claude".to_string());

    assert!(svc.submit(req).is_ok());
}

#[test]
fn cancel_reports_whether_the_run_was_active() {
    let svc = service(GatewayConfig::default());
    let run_id = svc.submit(request()).unwrap();
    assert!(svc.cancel(&run_id));
    assert!(!svc.cancel(&RunId::new()));
}

#[tokio::test]
async fn a_subscriber_receives_events_published_after_it_subscribes() {
    let svc = service(GatewayConfig::default());
    let mut subscription = svc.subscribe();

    let run_id = RunId::new();
    svc.event_bus().publish(JobEvent::log(run_id, "hello", 1_000));

    let event = subscription.recv().await.unwrap();
    assert_eq!(event.run_id, run_id);
    assert_eq!(event.summary, "hello");
}
