// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use gw_core::{
    ArtifactPolicy, DispatchRequest, ExecutionMode, FakeClock, GatewayConfig, RepositoryId, RunId, SandboxProfile,
    TaskId,
};
use gw_git::GitWorkspaceManager;
use gw_runtimes::RuntimeFactory;
use gw_wire::WireEnvelope;

use super::*;
use crate::executor::HarnessExecutor;

fn request(custom_command: &str) -> DispatchRequest {
    DispatchRequest {
        run_id: RunId::new(),
        task_id: TaskId::new(),
        repository_id: RepositoryId::new(),
        harness: "generic".to_string(),
        mode: ExecutionMode::Default,
        prompt: String::new(),
        multimodal_parts: Vec::new(),
        custom_command: Some(custom_command.to_string()),
        timeout_seconds: Some(10),
        clone_url: None,
        branch: None,
        env: HashMap::new(),
        labels: HashMap::new(),
        sandbox: SandboxProfile::default(),
        artifact_policy: ArtifactPolicy::default(),
        structured_protocol_version: None,
    }
}

#[derive(Default)]
struct RecordingEventBus {
    events: Mutex<Vec<JobEvent>>,
}

impl RecordingEventBus {
    fn events(&self) -> Vec<JobEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: JobEvent) {
        self.events.lock().unwrap().push(event);
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition never became true");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[test]
fn publish_chunk_projects_a_well_formed_wire_envelope() {
    let recorder = Arc::new(RecordingEventBus::default());
    let events: Arc<dyn EventBus> = recorder.clone();
    let envelope = WireEnvelope::new(1, "command_output", "hello");
    let bytes = envelope.to_json_bytes().unwrap();

    publish_chunk(&events, RunId::new(), &bytes, None, 1_000);

    let recorded = recorder.events();
    assert_eq!(recorded[0].event_type, "log_chunk");
    assert_eq!(recorded[0].category, "command.delta");
    assert_eq!(recorded[0].sequence, 1);
}

#[test]
fn publish_chunk_surfaces_unparseable_bytes_as_an_opaque_line() {
    let recorder = Arc::new(RecordingEventBus::default());
    let events: Arc<dyn EventBus> = recorder.clone();
    publish_chunk(&events, RunId::new(), b"not a wire envelope", None, 1_000);

    let recorded = recorder.events();
    assert_eq!(recorded[0].event_type, "log_chunk");
    assert_eq!(recorded[0].summary, "not a wire envelope");
    assert!(recorded[0].payload_json.is_none());
}

#[tokio::test]
async fn processing_a_job_publishes_a_started_event_and_a_terminal_completed_event() {
    let queue = Arc::new(JobQueue::new(4));
    let config =
        GatewayConfig { storage_root: std::env::temp_dir().join("gw-gateway-processor-test"), ..GatewayConfig::default() };
    let git = Arc::new(GitWorkspaceManager::new(std::env::temp_dir()));
    let runtimes = Arc::new(RuntimeFactory::new());
    let executor = Arc::new(HarnessExecutor::new(config, git, runtimes));
    let recorder = Arc::new(RecordingEventBus::default());
    let processor = Arc::new(JobProcessor::new(
        queue.clone(),
        executor,
        recorder.clone() as Arc<dyn EventBus>,
        Duration::from_secs(5),
        FakeClock::new(),
    ));

    queue.enqueue(request("echo from-processor-test")).unwrap();
    let handle = tokio::spawn(processor.clone().run());

    wait_until(|| recorder.events().iter().any(|e| e.event_type == "completed"), Duration::from_secs(5)).await;

    processor.shutdown_handle().cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

    let events = recorder.events();
    assert!(events.iter().any(|e| e.event_type == "log" && e.summary == "Job started"));
    assert!(events.iter().any(|e| e.event_type == "completed"));
}
