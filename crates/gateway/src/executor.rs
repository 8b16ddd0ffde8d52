// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`HarnessExecutor`]: orchestrates one job end to end -- git
//! serialization, workspace prep, runtime request construction, runtime
//! selection with fallback, envelope post-processing and artifact
//! extraction (§4.3).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gw_core::{
    ArtifactPolicy, CanonicalEvent, CanonicalEventType, DispatchRequest, ExecutionMode, GatewayConfig,
    HarnessRunRequest, QueuedJob, ResultEnvelope, RunStatus,
};
use gw_git::{FinalizeOutcome, GitWorkspaceManager};
use gw_runtimes::{RunContext, RuntimeFactory};
use gw_wire::RunEventSink;
use tracing::{info, warn};

/// Substituted for `summary` whenever a runtime-produced envelope fails
/// the non-empty status/summary invariant (§9, "validation fallback").
const CANNED_VALIDATION_SUMMARY: &str = "Run produced an invalid result";

pub struct HarnessExecutor {
    config: GatewayConfig,
    git: Arc<GitWorkspaceManager>,
    runtimes: Arc<RuntimeFactory>,
}

impl HarnessExecutor {
    pub fn new(config: GatewayConfig, git: Arc<GitWorkspaceManager>, runtimes: Arc<RuntimeFactory>) -> Self {
        Self { config, git, runtimes }
    }

    /// Runs one job to completion, never propagating a panic or error
    /// upward -- any unhandled failure collapses to a `failed` envelope.
    pub async fn execute(
        &self,
        job: &QueuedJob,
        on_chunk: Arc<dyn Fn(Vec<u8>) + Send + Sync>,
    ) -> ResultEnvelope {
        let ctx = RunContext::new(job.cancellation.clone());
        match self.execute_inner(&job.request, &ctx, on_chunk).await {
            Ok(envelope) => envelope,
            Err(summary) => ResultEnvelope::failed(job.request.run_id, job.request.task_id, summary),
        }
    }

    async fn execute_inner(
        &self,
        request: &DispatchRequest,
        ctx: &RunContext,
        on_chunk: Arc<dyn Fn(Vec<u8>) + Send + Sync>,
    ) -> Result<ResultEnvelope, String> {
        if ctx.is_cancelled() {
            return Ok(cancelled_envelope(request));
        }

        let workspace = match &request.clone_url {
            Some(clone_url) => {
                let prep = self.git.ensure_workspace_ready(
                    request.repository_id.as_str(),
                    request.task_id.as_str(),
                    clone_url,
                    request.branch.as_deref(),
                    &request.env,
                );
                tokio::select! {
                    _ = ctx.cancelled() => return Ok(cancelled_envelope(request)),
                    result = prep => match result {
                        Ok(lock) => Some(lock),
                        Err(err) => {
                            warn!(error = %err, run_id = %request.run_id, "workspace prep failed");
                            return Err("Workspace preparation failed".to_string());
                        }
                    },
                }
            }
            None => None,
        };

        let resolved_mode = resolve_mode(request);
        let harness_req = HarnessRunRequest::from_dispatch(
            request,
            resolved_mode,
            workspace.as_ref().map(|w| w.context.workspace_path.clone()),
            &self.config.storage_root,
        );

        let selection = self.runtimes.select(&harness_req);
        let adapter = self.runtimes.adapter_for(&harness_req.harness);
        if let Some(workspace_path) = &harness_req.workspace_path {
            adapter.prepare_context(&harness_req, workspace_path);
        }

        let sink = RunEventSink::new(Arc::new(move |bytes: Vec<u8>| on_chunk(bytes)));
        let mut executed_runtime_name = selection.primary.name();
        let mut result = selection.primary.run(&harness_req, &sink, ctx).await;
        let mut fallback_metadata = HashMap::new();
        if let (Err(err), Some(fallback)) = (&result, &selection.fallback) {
            if !ctx.is_cancelled() {
                warn!(error = %err, run_id = %request.run_id, "structured runtime failed, falling back");
                fallback_metadata.insert("structuredRuntimeFallback".to_string(), "true".to_string());
                fallback_metadata.insert("structuredRuntimeFailure".to_string(), err.to_string());
                sink.publish(&CanonicalEvent::new(
                    CanonicalEventType::Error,
                    format!("Falling back to {} runtime: {err}", fallback.name()),
                ));
                executed_runtime_name = fallback.name();
                result = fallback.run(&harness_req, &sink, ctx).await;
            }
        }

        let runtime_result = match result {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, run_id = %request.run_id, "runtime failed with no usable fallback");
                return Err("Harness execution crashed".to_string());
            }
        };

        let mut envelope = runtime_result.envelope;
        envelope.run_id = request.run_id;
        envelope.task_id = request.task_id;
        for (key, value) in fallback_metadata {
            envelope.metadata.insert(key, value);
        }
        envelope.metadata.insert("runtimeMode".to_string(), selection.runtime_mode.clone());
        envelope.metadata.insert("runtimeName".to_string(), executed_runtime_name.to_string());

        if !envelope.is_valid_for_external_surfacing() {
            envelope.status = RunStatus::Failed;
            envelope.summary = CANNED_VALIDATION_SUMMARY.to_string();
        }

        if let Some(lock) = &workspace {
            let succeeded = envelope.status == RunStatus::Succeeded;
            let outcome = self
                .git
                .finalize(lock, &request.task_id, &request.run_id, succeeded, &request.env)
                .await;
            apply_finalize_outcome(&mut envelope, outcome);
        }

        let classification = adapter.classify_failure(&envelope);
        if !classification.category.is_empty() {
            envelope.metadata.insert("failureCategory".to_string(), classification.category);
            envelope.metadata.insert("failureDetail".to_string(), classification.detail);
        }
        let artifact_map = adapter.map_artifacts(&harness_req);
        for (name, relative_path) in artifact_map.paths {
            envelope.metadata.insert(format!("artifact.{name}"), relative_path);
        }

        if let Some(workspace_path) = &harness_req.workspace_path {
            let extracted =
                extract_artifacts(workspace_path, &harness_req.artifacts_host_path, request.artifact_policy).await;
            envelope.artifacts.extend(extracted);
        }

        info!(run_id = %request.run_id, status = %envelope.status, "job finished");
        Ok(envelope)
    }
}

fn cancelled_envelope(request: &DispatchRequest) -> ResultEnvelope {
    ResultEnvelope::failed(request.run_id, request.task_id, "Run cancelled or timed out")
}

fn apply_finalize_outcome(envelope: &mut ResultEnvelope, outcome: FinalizeOutcome) {
    match outcome {
        FinalizeOutcome::Skipped => {
            envelope.metadata.insert("gitWorkflow".to_string(), "skipped/non-success-run".to_string());
        }
        FinalizeOutcome::Obsolete => {
            envelope.summary = "No changes produced".to_string();
            envelope.metadata.insert("runDisposition".to_string(), "obsolete".to_string());
            envelope.metadata.insert("obsoleteReason".to_string(), "no-diff".to_string());
        }
        FinalizeOutcome::Pushed => {
            envelope.metadata.insert("gitWorkflow".to_string(), "main-pushed".to_string());
        }
        FinalizeOutcome::Failed { reason } => {
            envelope.status = RunStatus::Failed;
            envelope.summary = reason;
            envelope.metadata.insert("gitWorkflow".to_string(), "failed".to_string());
        }
    }
}

/// Runtime-mode resolution ladder (§4.3 step 3): `HARNESS_RUNTIME_MODE`,
/// then harness-specific hints, then `HARNESS_MODE`/`HARNESS_EXECUTION_MODE`,
/// then the requested mode, else `"command"`. Env lookups are
/// case-insensitive; an explicit override is never silently rewritten.
fn resolve_mode(request: &DispatchRequest) -> String {
    if let Some(v) = env_ci(&request.env, "HARNESS_RUNTIME_MODE") {
        return v;
    }
    if request.harness.eq_ignore_ascii_case("codex") {
        if let Some(v) = env_ci(&request.env, "CODEX_TRANSPORT") {
            return v;
        }
        if let Some(v) = env_ci(&request.env, "CODEX_MODE") {
            return v;
        }
    }
    if let Some(v) = env_ci(&request.env, "HARNESS_MODE") {
        return v;
    }
    if let Some(v) = env_ci(&request.env, "HARNESS_EXECUTION_MODE") {
        return v;
    }
    match request.mode {
        ExecutionMode::Plan => "plan".to_string(),
        ExecutionMode::Review => "review".to_string(),
        ExecutionMode::Default => "command".to_string(),
    }
}

fn env_ci(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v.clone())
}

/// Walks `workspace_path` (skipping `.git`) and copies files into
/// `artifacts_host_path` until either cap is hit, returning the
/// destination paths actually copied.
async fn extract_artifacts(workspace_path: &Path, artifacts_host_path: &Path, policy: ArtifactPolicy) -> Vec<PathBuf> {
    let mut extracted = Vec::new();
    let mut total_bytes: u64 = 0;

    if tokio::fs::create_dir_all(artifacts_host_path).await.is_err() {
        return extracted;
    }

    let mut stack = vec![workspace_path.to_path_buf()];
    'walk: while let Some(dir) = stack.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if extracted.len() >= policy.max_count || total_bytes >= policy.max_bytes {
                break 'walk;
            }
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                if entry.file_name() == ".git" {
                    continue;
                }
                stack.push(path);
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            let size = metadata.len();
            if total_bytes + size > policy.max_bytes {
                continue;
            }
            let Ok(relative) = path.strip_prefix(workspace_path) else {
                continue;
            };
            let destination = artifacts_host_path.join(relative);
            if let Some(parent) = destination.parent() {
                if tokio::fs::create_dir_all(parent).await.is_err() {
                    continue;
                }
            }
            if tokio::fs::copy(&path, &destination).await.is_ok() {
                total_bytes += size;
                extracted.push(destination);
            }
        }
    }
    extracted
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
