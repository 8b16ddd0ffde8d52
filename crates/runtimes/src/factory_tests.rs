// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::time::Duration;

use gw_core::{RepositoryId, RunId, SandboxProfile, TaskId};

use super::*;

fn base_request(harness: &str) -> HarnessRunRequest {
    HarnessRunRequest {
        run_id: RunId::new(),
        task_id: TaskId::new(),
        repository_id: RepositoryId::new(),
        harness: harness.to_string(),
        mode: "command".to_string(),
        prompt: "do the thing".to_string(),
        multimodal_parts: Vec::new(),
        custom_command: None,
        timeout: Duration::from_secs(900),
        workspace_path: None,
        artifacts_host_path: "/tmp/artifacts".into(),
        env: HashMap::new(),
        labels: HashMap::new(),
        sandbox: SandboxProfile::default(),
        artifact_policy: Default::default(),
        structured_protocol_version: None,
    }
}

#[test]
fn known_harness_gets_structured_primary_and_generic_fallback() {
    let factory = RuntimeFactory::new();
    let selection = factory.select(&base_request("claude"));
    assert!(selection.fallback.is_some());
    assert_eq!(selection.runtime_mode, "command");
}

#[test]
fn unknown_harness_runs_directly_on_the_generic_runtime_with_no_fallback() {
    let factory = RuntimeFactory::new();
    let selection = factory.select(&base_request("some-custom-harness"));
    assert!(selection.fallback.is_none());
}

#[test]
fn codex_harness_also_gets_a_structured_primary() {
    let factory = RuntimeFactory::new();
    let selection = factory.select(&base_request("codex"));
    assert!(selection.fallback.is_some());
}

#[test]
fn adapter_for_unknown_harness_falls_back_to_the_generic_adapter() {
    let factory = RuntimeFactory::new();
    let req = base_request("some-custom-harness");
    let adapter = factory.adapter_for(&req.harness);
    let envelope = ResultEnvelope::failed(req.run_id, req.task_id, "boom").with_error("workspace blew up");
    assert_eq!(adapter.classify_failure(&envelope).category, "workspace_error");
}

#[test]
fn categorize_error_maps_cancellation_text_to_timeout() {
    let classification = categorize_error("Run cancelled or timed out");
    assert_eq!(classification.category, "timeout");
}

#[test]
fn categorize_error_maps_unrecognized_text_to_harness_error() {
    let classification = categorize_error("unexpected explosion");
    assert_eq!(classification.category, "harness_error");
}

#[test]
fn classify_by_status_returns_none_for_a_successful_envelope() {
    let run_id = RunId::new();
    let task_id = TaskId::new();
    let envelope = ResultEnvelope::succeeded(run_id, task_id, "all good");
    assert_eq!(classify_by_status(&envelope).category, "");
}
