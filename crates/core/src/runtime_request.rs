// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`HarnessRunRequest`]: the runtime-facing view derived from a
//! [`DispatchRequest`](crate::request::DispatchRequest).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ids::{RepositoryId, RunId, TaskId};
use crate::request::{ArtifactPolicy, DispatchRequest, MultimodalPart, SandboxProfile};

/// What a harness runtime actually needs to run: the dispatch request's
/// fields, plus the workspace path the executor prepared and a resolved
/// (not requested) mode and timeout.
#[derive(Debug, Clone)]
pub struct HarnessRunRequest {
    pub run_id: RunId,
    pub task_id: TaskId,
    pub repository_id: RepositoryId,

    pub harness: String,
    /// Resolved mode string, e.g. `"command"`, `"plan"`, `"stream-json"` --
    /// not the same enum as `DispatchRequest::mode`; see §4.3 of the
    /// runtime-mode resolution ladder.
    pub mode: String,
    pub prompt: String,
    pub multimodal_parts: Vec<MultimodalPart>,
    pub custom_command: Option<String>,
    pub timeout: Duration,

    pub workspace_path: Option<PathBuf>,
    pub artifacts_host_path: PathBuf,

    pub env: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub sandbox: SandboxProfile,
    pub artifact_policy: ArtifactPolicy,
    pub structured_protocol_version: Option<String>,
}

impl HarnessRunRequest {
    /// Build from a `DispatchRequest`, an already-resolved mode string, and
    /// the storage root used to derive `artifacts_host_path`.
    pub fn from_dispatch(
        request: &DispatchRequest,
        resolved_mode: impl Into<String>,
        workspace_path: Option<PathBuf>,
        storage_root: &Path,
    ) -> Self {
        Self {
            run_id: request.run_id,
            task_id: request.task_id,
            repository_id: request.repository_id,
            harness: request.harness.clone(),
            mode: resolved_mode.into(),
            prompt: request.prompt.clone(),
            multimodal_parts: request.multimodal_parts.clone(),
            custom_command: request.custom_command.clone(),
            timeout: request.timeout(),
            workspace_path,
            artifacts_host_path: storage_root.join(request.run_id.as_str()),
            env: request.env.clone(),
            labels: request.labels.clone(),
            sandbox: request.sandbox.clone(),
            artifact_policy: request.artifact_policy,
            structured_protocol_version: request.structured_protocol_version.clone(),
        }
    }
}

#[cfg(test)]
#[path = "runtime_request_tests.rs"]
mod tests;
