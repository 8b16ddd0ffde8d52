// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gwctl run` - submit one [`DispatchRequest`] to an in-process gateway,
//! stream its events to the terminal, and exit with a status-derived code.
//!
//! There is no standalone daemon here: this command builds the same
//! queue/executor/processor wiring a long-lived gateway process would, runs
//! exactly one job through it, and tears the wiring back down once that job
//! reaches a terminal state. Ctrl-C cancels the in-flight run rather than
//! killing the process outright.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use gw_core::{ArtifactPolicy, DispatchRequest, ExecutionMode, GatewayConfig, RepositoryId, RunId, SandboxProfile, SystemClock, TaskId};
use gw_gateway::{BroadcastEventBus, HarnessExecutor, JobEvent, JobProcessor, JobQueue, Service};
use gw_git::GitWorkspaceManager;
use gw_runtimes::RuntimeFactory;
use tokio::sync::broadcast::error::RecvError;

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct RunArgs {
    /// Harness to dispatch to (e.g. "claude", "codex", or "generic").
    #[arg(long, default_value = "generic")]
    pub harness: String,

    /// Execution mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Default)]
    pub mode: ModeArg,

    /// Prompt text handed to the harness.
    #[arg(long, default_value = "")]
    pub prompt: String,

    /// Shell command for the generic runtime, in place of a prompt.
    #[arg(long)]
    pub custom_command: Option<String>,

    /// Clone this repository before running, and push on success.
    #[arg(long)]
    pub clone_url: Option<String>,

    /// Branch to check out; defaults to the repository's default branch.
    #[arg(long)]
    pub branch: Option<String>,

    /// Reuse an existing task id, for workspace/mutex sharing across runs.
    #[arg(long)]
    pub task_id: Option<String>,

    /// Reuse an existing repository id.
    #[arg(long)]
    pub repository_id: Option<String>,

    /// Kill the run after this many seconds.
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Environment variable passed to the harness, as `KEY=VALUE`. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Container label, as `KEY=VALUE`. Repeatable. A `image` label is
    /// checked against the configured image allow-list.
    #[arg(long = "label", value_name = "KEY=VALUE")]
    pub label: Vec<String>,

    /// Disable network access inside the run's sandbox.
    #[arg(long)]
    pub network_disabled: bool,

    /// Mount the run's sandbox rootfs read-only.
    #[arg(long)]
    pub read_only_rootfs: bool,

    /// Cap the number of artifacts extracted from the workspace.
    #[arg(long)]
    pub artifact_max_count: Option<usize>,

    /// Cap the total bytes of artifacts extracted from the workspace.
    #[arg(long)]
    pub artifact_max_bytes: Option<u64>,

    /// Hints the structured wire protocol version the runtime should target.
    #[arg(long)]
    pub structured_protocol_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Default,
    Plan,
    Review,
}

impl From<ModeArg> for ExecutionMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Default => ExecutionMode::Default,
            ModeArg::Plan => ExecutionMode::Plan,
            ModeArg::Review => ExecutionMode::Review,
        }
    }
}

pub async fn handle(args: RunArgs, format: OutputFormat) -> Result<i32> {
    let request = build_request(&args)?;
    let run_id = request.run_id;

    let config = GatewayConfig::from_env();
    let git = Arc::new(GitWorkspaceManager::new(config.workspaces_root.clone()));
    let runtimes = Arc::new(RuntimeFactory::new());
    let queue = Arc::new(JobQueue::new(config.max_slots));
    let executor = Arc::new(HarnessExecutor::new(config.clone(), git, runtimes));
    let events = Arc::new(BroadcastEventBus::new(256));
    let service = Arc::new(Service::new(config.clone(), queue.clone(), events.clone()));

    let processor =
        Arc::new(JobProcessor::new(queue, executor, service.event_bus(), config.shutdown_timeout, SystemClock));
    let shutdown = processor.shutdown_handle();
    let processor_task = tokio::spawn(processor.run());

    let mut subscription = service.subscribe();
    if let Err(err) = service.submit(request) {
        shutdown.cancel();
        let _ = processor_task.await;
        bail!(ExitError::new(2, format!("submission rejected: {err}")));
    }

    tokio::spawn({
        let service = service.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("received interrupt, cancelling run {run_id}...");
                service.cancel(&run_id);
            }
        }
    });

    let envelope = loop {
        match subscription.recv().await {
            Ok(event) if event.run_id == run_id => {
                print_event(&event, format);
                if event.event_type == "completed" {
                    break event.payload_json.clone().unwrap_or(serde_json::Value::Null);
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break serde_json::Value::Null,
        }
    };

    shutdown.cancel();
    let _ = processor_task.await;

    print_envelope(&envelope, format);
    let succeeded = envelope.get("status").and_then(|v| v.as_str()) == Some("succeeded");
    Ok(if succeeded { 0 } else { 1 })
}

fn build_request(args: &RunArgs) -> Result<DispatchRequest> {
    let env = parse_kv_pairs(&args.env)?;
    let labels = parse_kv_pairs(&args.label)?;

    let task_id = args.task_id.as_deref().map(TaskId::from_string).unwrap_or_else(TaskId::new);
    let repository_id =
        args.repository_id.as_deref().map(RepositoryId::from_string).unwrap_or_else(RepositoryId::new);

    let mut sandbox = SandboxProfile::default();
    sandbox.network_disabled = args.network_disabled;
    sandbox.read_only_rootfs = args.read_only_rootfs;

    let mut artifact_policy = ArtifactPolicy::default();
    if let Some(max_count) = args.artifact_max_count {
        artifact_policy.max_count = max_count;
    }
    if let Some(max_bytes) = args.artifact_max_bytes {
        artifact_policy.max_bytes = max_bytes;
    }

    Ok(DispatchRequest {
        run_id: RunId::new(),
        task_id,
        repository_id,
        harness: args.harness.clone(),
        mode: args.mode.into(),
        prompt: args.prompt.clone(),
        multimodal_parts: Vec::new(),
        custom_command: args.custom_command.clone(),
        timeout_seconds: args.timeout_seconds,
        clone_url: args.clone_url.clone(),
        branch: args.branch.clone(),
        env,
        labels,
        sandbox,
        artifact_policy,
        structured_protocol_version: args.structured_protocol_version.clone(),
    })
}

fn parse_kv_pairs(items: &[String]) -> Result<HashMap<String, String>> {
    let mut out = HashMap::with_capacity(items.len());
    for item in items {
        let Some((key, value)) = item.split_once('=') else {
            bail!("expected KEY=VALUE, got {item:?}");
        };
        out.insert(key.to_string(), value.to_string());
    }
    Ok(out)
}

fn print_event(event: &JobEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let line = serde_json::json!({
                "run_id": event.run_id.as_str(),
                "event_type": event.event_type,
                "summary": event.summary,
                "category": event.category,
                "sequence": event.sequence,
                "schema_version": event.schema_version,
                "timestamp_ms": event.timestamp_ms,
                "payload": event.payload_json,
            });
            println!("{line}");
        }
        OutputFormat::Text => {
            let detail = if !event.category.is_empty() {
                format!("[{}]", event.category)
            } else if !event.summary.is_empty() {
                event.summary.clone()
            } else {
                String::new()
            };
            println!("{:>9}  {}", event.event_type, detail);
        }
    }
}

fn print_envelope(envelope: &serde_json::Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(pretty) = serde_json::to_string_pretty(envelope) {
                println!("{pretty}");
            }
        }
        OutputFormat::Text => {
            let status = envelope.get("status").and_then(|v| v.as_str()).unwrap_or("unknown");
            let summary = envelope.get("summary").and_then(|v| v.as_str()).unwrap_or("");
            println!("status:  {status}");
            println!("summary: {summary}");
            if let Some(error) = envelope.get("error").and_then(|v| v.as_str()) {
                println!("error:   {error}");
            }
            if let Some(artifacts) = envelope.get("artifacts").and_then(|v| v.as_array()) {
                if !artifacts.is_empty() {
                    println!("artifacts: {} file(s)", artifacts.len());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
