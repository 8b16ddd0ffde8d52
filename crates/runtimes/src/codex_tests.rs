// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use gw_core::{HarnessRunRequest, MultimodalPart};
use gw_redact::{PatternSet, Redactor};
use serde_json::json;

use super::*;

fn base_request() -> HarnessRunRequest {
    use gw_core::{RepositoryId, RunId, SandboxProfile, TaskId};
    use std::time::Duration;

    HarnessRunRequest {
        run_id: RunId::new(),
        task_id: TaskId::new(),
        repository_id: RepositoryId::new(),
        harness: "codex".to_string(),
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
fn approval_policy_defaults_to_never_for_plan_and_review() {
    let mut req = base_request();
    req.mode = "plan".to_string();
    assert_eq!(approval_policy(&req), "never");
    req.mode = "review".to_string();
    assert_eq!(approval_policy(&req), "never");
    req.mode = "command".to_string();
    assert_eq!(approval_policy(&req), "on-failure");
}

#[test]
fn approval_policy_env_override_wins() {
    let mut req = base_request();
    req.env.insert("CODEX_APPROVAL_POLICY".to_string(), "always".to_string());
    assert_eq!(approval_policy(&req), "always");
}

#[test]
fn sandbox_mode_defaults_to_danger_full_access() {
    let req = base_request();
    assert_eq!(sandbox_mode(&req), "danger-full-access");
}

#[test]
fn sandbox_mode_env_override_wins() {
    let mut req = base_request();
    req.env.insert("CODEX_SANDBOX".to_string(), "read-only".to_string());
    assert_eq!(sandbox_mode(&req), "read-only");
}

#[test]
fn build_turn_input_is_text_only_without_native_multimodal_preference() {
    let mut req = base_request();
    req.multimodal_parts = vec![MultimodalPart::Image { reference: "img-1".to_string() }];
    let input = build_turn_input(&req, false);
    assert_eq!(input, json!(req.prompt));
}

#[test]
fn build_turn_input_sends_mixed_array_when_preferring_native_multimodal_with_images() {
    let mut req = base_request();
    req.env.insert("CODEX_PREFER_NATIVE_MULTIMODAL".to_string(), "true".to_string());
    req.multimodal_parts = vec![
        MultimodalPart::Text { text: "look at this".to_string() },
        MultimodalPart::Image { reference: "img-1".to_string() },
    ];
    let input = build_turn_input(&req, false);
    assert!(input.is_array());
    assert_eq!(input.as_array().unwrap().len(), 2);
}

#[test]
fn build_turn_input_forces_text_only_when_requested_even_with_preference_set() {
    let mut req = base_request();
    req.env.insert("CODEX_PREFER_NATIVE_MULTIMODAL".to_string(), "true".to_string());
    req.multimodal_parts = vec![MultimodalPart::Image { reference: "img-1".to_string() }];
    let input = build_turn_input(&req, true);
    assert_eq!(input, json!(req.prompt));
}

#[test]
fn classify_notification_maps_agent_message_delta() {
    let redactor = Redactor::new(PatternSet::default());
    let env = HashMap::new();
    let frame = json!({ "method": "item/agentMessage/delta", "params": { "delta": "hello" } });
    let event = classify_notification(&frame, &redactor, &env).expect("mapped event");
    assert_eq!(event.content, "hello");
}

#[test]
fn classify_notification_maps_reasoning_delta_variants() {
    let redactor = Redactor::new(PatternSet::default());
    let env = HashMap::new();
    let frame = json!({ "method": "item/reasoning/summaryDelta", "params": { "delta": "thinking" } });
    let event = classify_notification(&frame, &redactor, &env).expect("mapped event");
    assert_eq!(event.content, "thinking");
}

#[test]
fn classify_notification_returns_none_for_unrecognized_method() {
    let redactor = Redactor::new(PatternSet::default());
    let env = HashMap::new();
    let frame = json!({ "method": "some/unknown/method", "params": {} });
    assert!(classify_notification(&frame, &redactor, &env).is_none());
}
