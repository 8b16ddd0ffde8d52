// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::{HashMap, VecDeque};
use std::process::Stdio;

use async_trait::async_trait;
use gw_core::{CanonicalEvent, CanonicalEventType, HarnessRunRequest, ResultEnvelope, RunStatus};
use gw_redact::{PatternSet, Redactor};
use gw_wire::RunEventSink;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::context::RunContext;
use crate::error::RuntimeError;
use crate::result::RuntimeResult;
use crate::HarnessRuntime;

/// Normalized events are retained for the `normalizedEvents` metadata
/// field up to this many entries (FIFO) and this many characters.
const NORMALIZED_EVENTS_MAX_COUNT: usize = 512;
const NORMALIZED_EVENTS_MAX_CHARS: usize = 20_000;

/// Plan/review mode instruction headers prepended to the prompt.
const PLAN_MODE_HEADER: &str =
    "You are in plan mode. Do not make any changes; describe your intended approach only.\n\n";
const REVIEW_MODE_HEADER: &str =
    "You are in review mode. Do not make any changes; review the existing code and report findings only.\n\n";

/// Drives `claude -p --output-format stream-json`, parsing one JSON object
/// per stdout line into canonical events.
pub struct ClaudeStreamRuntime;

impl ClaudeStreamRuntime {
    pub fn new() -> Self {
        Self
    }

    fn build_prompt(&self, req: &HarnessRunRequest) -> String {
        match req.mode.as_str() {
            "plan" => format!("{PLAN_MODE_HEADER}{}", req.prompt),
            "review" => format!("{REVIEW_MODE_HEADER}{}", req.prompt),
            _ => req.prompt.clone(),
        }
    }

    fn spawn(&self, req: &HarnessRunRequest) -> Result<Child, RuntimeError> {
        let mut command = Command::new("claude");
        command.arg("-p").arg("--verbose").arg("--output-format").arg("stream-json");
        command.arg("--include-partial-messages");
        if let Some(model) = req.env.get("CLAUDE_MODEL") {
            command.arg("--model").arg(model);
        }
        command.arg(self.build_prompt(req));

        command.envs(&req.env);
        command.env("CLAUDE_OUTPUT_FORMAT", "stream-json");
        command.env("CLAUDE_INCLUDE_PARTIAL_MESSAGES", "true");
        command.env("HARNESS_RUNTIME_PROVIDER", "claude-code");
        command.env("NO_COLOR", "1");

        if let Some(workspace) = &req.workspace_path {
            command.current_dir(workspace);
        }

        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        Ok(command.spawn()?)
    }
}

impl Default for ClaudeStreamRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-block state tracked across `content_block_start/delta/stop` frames,
/// keyed by the block's index within the current message.
#[derive(Default, Clone)]
struct BlockState {
    block_type: String,
    tool_name: Option<String>,
    tool_call_id: Option<String>,
}

/// Accumulates stream state across the whole run.
struct StreamState {
    model: Option<String>,
    stop_reason: Option<String>,
    assistant_buffer: String,
    usage: HashMap<String, f64>,
    blocks: HashMap<i64, BlockState>,
    stream_event_count: usize,
    tool_lifecycle_count: usize,
    normalized_events: VecDeque<String>,
    normalized_events_chars: usize,
    final_status: Option<String>,
    final_summary: Option<String>,
    final_error: Option<String>,
}

impl StreamState {
    fn new() -> Self {
        Self {
            model: None,
            stop_reason: None,
            assistant_buffer: String::new(),
            usage: HashMap::new(),
            blocks: HashMap::new(),
            stream_event_count: 0,
            tool_lifecycle_count: 0,
            normalized_events: VecDeque::new(),
            normalized_events_chars: 0,
            final_status: None,
            final_summary: None,
            final_error: None,
        }
    }

    fn record_normalized(&mut self, descriptor: String) {
        self.normalized_events_chars += descriptor.len();
        self.normalized_events.push_back(descriptor);
        while self.normalized_events.len() > NORMALIZED_EVENTS_MAX_COUNT
            || self.normalized_events_chars > NORMALIZED_EVENTS_MAX_CHARS
        {
            if let Some(dropped) = self.normalized_events.pop_front() {
                self.normalized_events_chars =
                    self.normalized_events_chars.saturating_sub(dropped.len());
            } else {
                break;
            }
        }
    }

    fn normalized_events_joined(&self) -> String {
        self.normalized_events.iter().cloned().collect::<Vec<_>>().join("\n")
    }
}

/// Case-insensitive substring classification of a harness-reported status
/// string into the gateway's vocabulary.
fn normalize_status(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("success") || lower.contains("succeeded") || lower.contains("complete") {
        "succeeded"
    } else if lower.contains("fail") || lower.contains("error") {
        "failed"
    } else if lower.contains("cancel") {
        "cancelled"
    } else if lower.contains("pending") || lower.contains("running") || lower.contains("progress") {
        "pending"
    } else {
        "unknown"
    }
}

fn looks_tool_related(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    ["tool", "bash", "command", "exec"].iter().any(|kw| lower.contains(kw))
}

fn handle_line(line: &str, state: &mut StreamState, sink: &RunEventSink, redactor: &Redactor, env: &HashMap<String, String>) {
    state.stream_event_count += 1;

    let parsed: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(_) => {
            let content = redactor.redact(line, env);
            sink.publish(&CanonicalEvent::new(CanonicalEventType::RunLifecycle, content).with_metadata("kind", "log"));
            state.record_normalized(format!("log:{}", line.len()));
            return;
        }
    };

    let type_field = parsed.get("type").and_then(Value::as_str);

    match type_field {
        Some("message_start") => {
            if let Some(model) = parsed.pointer("/message/model").and_then(Value::as_str) {
                state.model = Some(model.to_string());
            }
            sink.publish(&CanonicalEvent::new(CanonicalEventType::RunLifecycle, "message_start"));
            state.record_normalized("run.lifecycle:message_start".to_string());
        }
        Some("content_block_start") => {
            let index = parsed.get("index").and_then(Value::as_i64).unwrap_or(0);
            let block_type =
                parsed.pointer("/content_block/type").and_then(Value::as_str).unwrap_or("").to_string();
            let tool_name = parsed.pointer("/content_block/name").and_then(Value::as_str).map(str::to_string);
            let tool_call_id = parsed.pointer("/content_block/id").and_then(Value::as_str).map(str::to_string);

            let is_tool = block_type == "tool_use";
            state.blocks.insert(
                index,
                BlockState { block_type: block_type.clone(), tool_name: tool_name.clone(), tool_call_id: tool_call_id.clone() },
            );

            if is_tool {
                state.tool_lifecycle_count += 1;
                let name = tool_name.clone().unwrap_or_default();
                let mut event = CanonicalEvent::new(CanonicalEventType::RunLifecycle, format!("tool_start:{name}"));
                if let Some(id) = &tool_call_id {
                    event = event.with_metadata("tool_call_id", id.clone());
                }
                sink.publish(&event);
                state.record_normalized(format!("run.lifecycle:tool_start:{name}"));
            }
        }
        Some("content_block_delta") => {
            let index = parsed.get("index").and_then(Value::as_i64).unwrap_or(0);
            let block = state.blocks.get(&index).cloned().unwrap_or_default();
            let delta_type = parsed.pointer("/delta/type").and_then(Value::as_str).unwrap_or("");

            if delta_type == "thinking_delta" {
                let text = parsed.pointer("/delta/thinking").and_then(Value::as_str).unwrap_or("");
                if !text.is_empty() {
                    let content = redactor.redact(text, env);
                    sink.publish(&CanonicalEvent::new(CanonicalEventType::ReasoningDelta, content));
                    state.record_normalized(format!("reasoning.delta:{}", text.len()));
                }
            } else if delta_type == "text_delta" || block.block_type == "text" {
                let text = parsed.pointer("/delta/text").and_then(Value::as_str).unwrap_or("");
                if !text.is_empty() {
                    state.assistant_buffer.push_str(text);
                    let content = redactor.redact(text, env);
                    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, content));
                    state.record_normalized(format!("assistant.delta:{}", text.len()));
                }
            }
        }
        Some("content_block_stop") => {
            let index = parsed.get("index").and_then(Value::as_i64).unwrap_or(0);
            if let Some(block) = state.blocks.get(&index) {
                if block.block_type == "tool_use" {
                    state.tool_lifecycle_count += 1;
                    let name = block.tool_name.clone().unwrap_or_default();
                    let mut event = CanonicalEvent::new(CanonicalEventType::RunLifecycle, format!("tool_stop:{name}"));
                    if let Some(id) = &block.tool_call_id {
                        event = event.with_metadata("tool_call_id", id.clone());
                    }
                    sink.publish(&event);
                    state.record_normalized(format!("run.lifecycle:tool_stop:{name}"));
                }
            }
        }
        Some("message_delta") => {
            if let Some(stop_reason) = parsed.pointer("/delta/stop_reason").and_then(Value::as_str) {
                state.stop_reason = Some(stop_reason.to_string());
            }
            if let Some(usage) = parsed.get("usage").and_then(Value::as_object) {
                for (key, value) in usage {
                    if let Some(n) = value.as_f64() {
                        state.usage.insert(key.clone(), n);
                    }
                }
                sink.publish(&CanonicalEvent::new(CanonicalEventType::UsageUpdated, "usage updated"));
                state.record_normalized("usage.updated".to_string());
            }
        }
        Some("result") | Some("final_result") | Some("final") => {
            apply_final(parsed, state);
        }
        Some("error") => {
            let message = parsed
                .get("error")
                .and_then(Value::as_str)
                .or_else(|| parsed.pointer("/error/message").and_then(Value::as_str))
                .unwrap_or("claude reported an error")
                .to_string();
            state.final_status = Some("failed".to_string());
            state.final_error = Some(message.clone());
            let content = redactor.redact(&message, env);
            sink.publish(&CanonicalEvent::new(CanonicalEventType::Error, content));
            state.record_normalized(format!("error:{}", message.len()));
        }
        Some(other) => {
            sink.publish(&CanonicalEvent::new(CanonicalEventType::RunLifecycle, other));
            state.record_normalized(format!("run.lifecycle:{other}"));
            if looks_tool_related(other) {
                state.tool_lifecycle_count += 1;
            }
        }
        None => {
            // Untyped object: treat as a final result if it carries the
            // expected shape, otherwise emit as a raw log line.
            let looks_like_result = parsed.get("status").is_some()
                || parsed.get("summary").is_some()
                || parsed.get("error").is_some()
                || parsed.get("success").is_some();
            if looks_like_result {
                apply_final(parsed, state);
            } else {
                let content = redactor.redact(line, env);
                sink.publish(&CanonicalEvent::new(CanonicalEventType::RunLifecycle, content).with_metadata("kind", "log"));
                state.record_normalized(format!("log:{}", line.len()));
            }
        }
    }
}

fn apply_final(parsed: Value, state: &mut StreamState) {
    let status = parsed
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            parsed.get("success").and_then(Value::as_bool).map(|ok| {
                if ok { "succeeded".to_string() } else { "failed".to_string() }
            })
        })
        .or_else(|| {
            parsed.get("is_error").and_then(Value::as_bool).map(|err| {
                if err { "failed".to_string() } else { "succeeded".to_string() }
            })
        });

    if let Some(status) = status {
        state.final_status = Some(normalize_status(&status).to_string());
    }
    if let Some(summary) = parsed.get("summary").and_then(Value::as_str) {
        state.final_summary = Some(summary.to_string());
    }
    if let Some(error) = parsed.get("error").and_then(Value::as_str) {
        state.final_error = Some(error.to_string());
    }
}

#[async_trait]
impl HarnessRuntime for ClaudeStreamRuntime {
    fn name(&self) -> &'static str {
        "claude-stream"
    }

    async fn run(
        &self,
        req: &HarnessRunRequest,
        sink: &RunEventSink,
        ctx: &RunContext,
    ) -> Result<RuntimeResult, RuntimeError> {
        let mut child = self.spawn(req)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stderr".to_string()))?;

        let redactor = Redactor::new(PatternSet::default());
        let mut state = StreamState::new();

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stderr_tail = String::new();

        let exit_code = tokio::select! {
            _ = ctx.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Ok(RuntimeResult::new(
                    true,
                    -1,
                    ResultEnvelope::failed(req.run_id, req.task_id, "Run cancelled or timed out"),
                ));
            }
            result = async {
                loop {
                    tokio::select! {
                        line = stdout_lines.next_line() => {
                            match line {
                                Ok(Some(line)) => handle_line(&line, &mut state, sink, &redactor, &req.env),
                                Ok(None) => break,
                                Err(err) => return Err(RuntimeError::Protocol(err.to_string())),
                            }
                        }
                        line = stderr_lines.next_line() => {
                            if let Ok(Some(line)) = line {
                                stderr_tail.push_str(&line);
                                stderr_tail.push('\n');
                            }
                        }
                    }
                }
                child.wait().await.map_err(RuntimeError::Spawn)
            } => result?,
        };

        let code = exit_code.code().unwrap_or(-1) as i64;

        let candidate = state.final_status.clone().unwrap_or_else(|| "unknown".to_string());
        let final_status = if candidate == "succeeded" && code != 0 {
            "failed".to_string()
        } else if candidate != "unknown" {
            candidate
        } else if code == 0 {
            "succeeded".to_string()
        } else {
            "failed".to_string()
        };

        let run_status = match final_status.as_str() {
            "succeeded" => RunStatus::Succeeded,
            "cancelled" => RunStatus::Cancelled,
            "pending" => RunStatus::Pending,
            _ => RunStatus::Failed,
        };

        let assistant_preview: String = state.assistant_buffer.chars().take(200).collect();
        let summary = state
            .final_summary
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| if !assistant_preview.is_empty() { Some(assistant_preview) } else { None })
            .unwrap_or_else(|| "Claude run finished with no summary".to_string());

        let mut envelope = ResultEnvelope::new(req.run_id, req.task_id, run_status, summary);
        if run_status != RunStatus::Succeeded {
            let error = state.final_error.clone().unwrap_or_else(|| {
                if !stderr_tail.is_empty() {
                    stderr_tail.chars().rev().take(5_000).collect::<Vec<_>>().into_iter().rev().collect()
                } else {
                    "Claude run failed".to_string()
                }
            });
            envelope = envelope.with_error(error);
        }

        envelope = envelope
            .with_metadata("runtime", "claude-stream")
            .with_metadata("provider", "claude-code")
            .with_metadata("mode", req.mode.clone())
            .with_metadata("exitCode", code.to_string())
            .with_metadata("streamEventCount", state.stream_event_count.to_string())
            .with_metadata("toolLifecycleCount", state.tool_lifecycle_count.to_string())
            .with_metadata("assistantChars", state.assistant_buffer.len().to_string())
            .with_metadata("normalizedEvents", state.normalized_events_joined());
        if let Some(stop_reason) = &state.stop_reason {
            envelope = envelope.with_metadata("stopReason", stop_reason.clone());
        }
        if let Some(model) = &state.model {
            envelope = envelope.with_metadata("model", model.clone());
        }

        if !state.usage.is_empty() {
            envelope.metrics = state.usage.clone();
        }

        Ok(RuntimeResult::new(true, code, envelope))
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
