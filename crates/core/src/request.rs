// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DispatchRequest`] and the value types it is built from.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ids::{RepositoryId, RunId, TaskId};

/// Requested execution mode. `Default` drives the harness's normal edit
/// loop; `Plan` and `Review` ask the harness to prepend a mode-specific
/// instruction header instead of making changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Default,
    Plan,
    Review,
}

crate::simple_display! {
    ExecutionMode {
        Default => "default",
        Plan => "plan",
        Review => "review",
    }
}

impl ExecutionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "plan" => Some(Self::Plan),
            "review" => Some(Self::Review),
            _ => None,
        }
    }
}

/// One part of a multimodal prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MultimodalPart {
    Text { text: String },
    Image { reference: String },
}

/// Resource limits applied to the run's sandbox container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxProfile {
    pub cpu_limit: f64,
    pub memory_bytes: u64,
    pub network_disabled: bool,
    pub read_only_rootfs: bool,
}

impl Default for SandboxProfile {
    fn default() -> Self {
        Self {
            cpu_limit: 1.5,
            memory_bytes: 2 * 1024 * 1024 * 1024,
            network_disabled: false,
            read_only_rootfs: false,
        }
    }
}

/// How many artifacts (and how much total data) the executor will extract
/// from the workspace after a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArtifactPolicy {
    pub max_count: usize,
    pub max_bytes: u64,
}

impl Default for ArtifactPolicy {
    fn default() -> Self {
        Self { max_count: 50, max_bytes: 100 * 1024 * 1024 }
    }
}

/// The admitted unit: a request for one harness run, as handed down by the
/// control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub run_id: RunId,
    pub task_id: TaskId,
    pub repository_id: RepositoryId,

    pub harness: String,
    pub mode: ExecutionMode,
    pub prompt: String,
    #[serde(default)]
    pub multimodal_parts: Vec<MultimodalPart>,
    pub custom_command: Option<String>,
    pub timeout_seconds: Option<u64>,

    pub clone_url: Option<String>,
    pub branch: Option<String>,

    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,

    #[serde(default)]
    pub sandbox: SandboxProfile,
    #[serde(default)]
    pub artifact_policy: ArtifactPolicy,

    /// Hints the protocol version the runtime should target, e.g.
    /// `"harness-structured-event-v2"`.
    pub structured_protocol_version: Option<String>,
}

impl DispatchRequest {
    /// `timeout_seconds`, or a request-less default of 900s (15 minutes).
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(900))
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn builder() -> DispatchRequestBuilder {
        DispatchRequestBuilder::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct DispatchRequestBuilder {
    run_id: RunId,
    task_id: TaskId,
    repository_id: RepositoryId,
    harness: String,
    mode: ExecutionMode,
    prompt: String,
    multimodal_parts: Vec<MultimodalPart>,
    custom_command: Option<String>,
    timeout_seconds: Option<u64>,
    clone_url: Option<String>,
    branch: Option<String>,
    env: HashMap<String, String>,
    labels: HashMap<String, String>,
    sandbox: SandboxProfile,
    artifact_policy: ArtifactPolicy,
    structured_protocol_version: Option<String>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for DispatchRequestBuilder {
    fn default() -> Self {
        Self {
            run_id: RunId::new(),
            task_id: TaskId::new(),
            repository_id: RepositoryId::new(),
            harness: "generic".to_string(),
            mode: ExecutionMode::Default,
            prompt: String::new(),
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
}

#[cfg(any(test, feature = "test-support"))]
impl DispatchRequestBuilder {
    pub fn harness(mut self, v: impl Into<String>) -> Self {
        self.harness = v.into();
        self
    }

    pub fn mode(mut self, v: ExecutionMode) -> Self {
        self.mode = v;
        self
    }

    pub fn prompt(mut self, v: impl Into<String>) -> Self {
        self.prompt = v.into();
        self
    }

    pub fn custom_command(mut self, v: impl Into<String>) -> Self {
        self.custom_command = Some(v.into());
        self
    }

    pub fn timeout_seconds(mut self, v: u64) -> Self {
        self.timeout_seconds = Some(v);
        self
    }

    pub fn clone_url(mut self, v: impl Into<String>) -> Self {
        self.clone_url = Some(v.into());
        self
    }

    pub fn branch(mut self, v: impl Into<String>) -> Self {
        self.branch = Some(v.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn task_id(mut self, v: TaskId) -> Self {
        self.task_id = v;
        self
    }

    pub fn repository_id(mut self, v: RepositoryId) -> Self {
        self.repository_id = v;
        self
    }

    pub fn build(self) -> DispatchRequest {
        DispatchRequest {
            run_id: self.run_id,
            task_id: self.task_id,
            repository_id: self.repository_id,
            harness: self.harness,
            mode: self.mode,
            prompt: self.prompt,
            multimodal_parts: self.multimodal_parts,
            custom_command: self.custom_command,
            timeout_seconds: self.timeout_seconds,
            clone_url: self.clone_url,
            branch: self.branch,
            env: self.env,
            labels: self.labels,
            sandbox: self.sandbox,
            artifact_policy: self.artifact_policy,
            structured_protocol_version: self.structured_protocol_version,
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
