// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::Stdio;

use async_trait::async_trait;
use gw_core::{CanonicalEvent, CanonicalEventType, HarnessRunRequest, MultimodalPart, ResultEnvelope};
use gw_redact::{PatternSet, Redactor};
use gw_wire::RunEventSink;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, ChildStdout, Command};

use crate::context::RunContext;
use crate::error::RuntimeError;
use crate::result::RuntimeResult;
use crate::HarnessRuntime;

/// How much of stderr to retain for a failure message when no structured
/// error was extracted from the protocol.
const STDERR_TAIL_BYTES: usize = 5 * 1024;

/// Drives `codex app-server --listen stdio://` over newline-delimited
/// JSON-RPC.
pub struct CodexAppServerRuntime;

impl CodexAppServerRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CodexAppServerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks JSON-RPC request ids and line I/O against the app-server child.
struct RpcSession {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: i64,
}

impl RpcSession {
    fn new(stdin: ChildStdin, stdout: ChildStdout) -> Self {
        Self { stdin, stdout: BufReader::new(stdout), next_id: 1 }
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    async fn write_request(&mut self, id: i64, method: &str, params: Value) -> Result<(), RuntimeError> {
        let frame = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let mut line = serde_json::to_string(&frame).map_err(|err| RuntimeError::Protocol(err.to_string()))?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Writes a request and reads lines until the matching response arrives,
    /// dispatching every notification seen along the way through `on_notification`.
    async fn call(
        &mut self,
        method: &str,
        params: Value,
        mut on_notification: impl FnMut(&Value),
    ) -> Result<Value, RuntimeError> {
        let id = self.take_id();
        self.write_request(id, method, params).await?;

        let mut line = String::new();
        loop {
            line.clear();
            let bytes = self.stdout.read_line(&mut line).await?;
            if bytes == 0 {
                return Err(RuntimeError::Protocol(format!(
                    "codex app-server exited before responding to {method}"
                )));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Ok(frame) = serde_json::from_str::<Value>(trimmed) else { continue };

            if frame.get("id").and_then(Value::as_i64) == Some(id) {
                if let Some(error) = frame.get("error") {
                    return Err(RuntimeError::Protocol(error.to_string()));
                }
                return Ok(frame.get("result").cloned().unwrap_or(Value::Null));
            }
            on_notification(&frame);
        }
    }

    /// Reads notifications until `predicate` matches one, returning it.
    /// Every notification seen (including the matching one) is also passed
    /// to `on_notification`.
    async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&Value) -> bool,
        mut on_notification: impl FnMut(&Value),
    ) -> Result<Value, RuntimeError> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes = self.stdout.read_line(&mut line).await?;
            if bytes == 0 {
                return Err(RuntimeError::Protocol(
                    "codex app-server exited before turn completion".to_string(),
                ));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Ok(frame) = serde_json::from_str::<Value>(trimmed) else { continue };
            on_notification(&frame);
            if predicate(&frame) {
                return Ok(frame);
            }
        }
    }
}

fn approval_policy(req: &HarnessRunRequest) -> String {
    if let Some(policy) = req.env.get("CODEX_APPROVAL_POLICY") {
        return policy.clone();
    }
    match req.mode.as_str() {
        "plan" | "review" => "never".to_string(),
        _ => "on-failure".to_string(),
    }
}

fn sandbox_mode(req: &HarnessRunRequest) -> String {
    req.env.get("CODEX_SANDBOX").cloned().unwrap_or_else(|| "danger-full-access".to_string())
}

fn prefers_native_multimodal(req: &HarnessRunRequest) -> bool {
    req.env.get("CODEX_PREFER_NATIVE_MULTIMODAL").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

fn build_turn_input(req: &HarnessRunRequest, text_only: bool) -> Value {
    let has_images = req.multimodal_parts.iter().any(|part| matches!(part, MultimodalPart::Image { .. }));
    if !text_only && prefers_native_multimodal(req) && has_images {
        let parts: Vec<Value> = req
            .multimodal_parts
            .iter()
            .map(|part| match part {
                MultimodalPart::Text { text } => json!({ "type": "text", "text": text }),
                MultimodalPart::Image { reference } => json!({ "type": "image", "image": reference }),
            })
            .collect();
        json!(parts)
    } else {
        json!(req.prompt)
    }
}

/// Classifies one notification frame's method into a canonical event, if any.
fn classify_notification(frame: &Value, redactor: &Redactor, env: &std::collections::HashMap<String, String>) -> Option<CanonicalEvent> {
    let method = frame.get("method").and_then(Value::as_str)?;
    let params = frame.get("params").cloned().unwrap_or(Value::Null);

    let (event_type, content) = match method {
        "item/agentMessage/delta" => {
            (CanonicalEventType::AssistantDelta, params.get("delta").and_then(Value::as_str)?.to_string())
        }
        m if m.starts_with("item/reasoning/") && m.ends_with("Delta") => {
            (CanonicalEventType::ReasoningDelta, params.get("delta").and_then(Value::as_str)?.to_string())
        }
        "item/commandExecution/outputDelta" => {
            (CanonicalEventType::CommandDelta, params.get("delta").and_then(Value::as_str)?.to_string())
        }
        "item/fileChange/outputDelta" => {
            (CanonicalEventType::CommandDelta, params.get("delta").and_then(Value::as_str)?.to_string())
        }
        "turn/diff/updated" => {
            (CanonicalEventType::DiffUpdated, params.get("diff").and_then(Value::as_str).unwrap_or("").to_string())
        }
        "turn/started" | "turn/completed" => {
            (CanonicalEventType::RunLifecycle, method.to_string())
        }
        "error" => {
            (CanonicalEventType::Error, params.get("message").and_then(Value::as_str).unwrap_or("codex error").to_string())
        }
        _ => return None,
    };

    let content = redactor.redact(&content, env);
    Some(CanonicalEvent::new(event_type, content))
}

#[async_trait]
impl HarnessRuntime for CodexAppServerRuntime {
    fn name(&self) -> &'static str {
        "codex-app-server"
    }

    async fn run(
        &self,
        req: &HarnessRunRequest,
        sink: &RunEventSink,
        ctx: &RunContext,
    ) -> Result<RuntimeResult, RuntimeError> {
        let redactor = Redactor::new(PatternSet::default());

        let mut command = Command::new("codex");
        command.arg("app-server").arg("--listen").arg("stdio://");
        command.envs(&req.env);
        if let Some(workspace) = &req.workspace_path {
            command.current_dir(workspace);
        }
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        let mut child = command.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stderr".to_string()))?;

        let run_future = async move {
            let mut session = RpcSession::new(stdin, stdout);

            session
                .call(
                    "initialize",
                    json!({ "clientInfo": { "name": "task-runtime-gateway", "version": env!("CARGO_PKG_VERSION") }, "experimentalApi": true }),
                    |_| {},
                )
                .await?;

            let workspace_cwd = req
                .workspace_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();

            let thread_result = session
                .call(
                    "thread/start",
                    json!({
                        "cwd": workspace_cwd,
                        "approvalPolicy": approval_policy(req),
                        "sandbox": sandbox_mode(req),
                        "ephemeral": true,
                    }),
                    |_| {},
                )
                .await?;
            let thread_id = thread_result.get("threadId").and_then(Value::as_str).unwrap_or("").to_string();

            let mut retried_text_only = false;
            let mut input = build_turn_input(req, false);
            loop {
                let turn_result = session
                    .call(
                        "turn/start",
                        json!({ "threadId": thread_id, "input": input, "cwd": workspace_cwd }),
                        |frame| {
                            if let Some(event) = classify_notification(frame, &redactor, &req.env) {
                                sink.publish(&event);
                            }
                        },
                    )
                    .await;

                match turn_result {
                    Ok(_) => break,
                    Err(err) if !retried_text_only && !matches!(input, Value::String(_)) => {
                        retried_text_only = true;
                        sink.publish(&CanonicalEvent::new(
                            CanonicalEventType::RunLifecycle,
                            format!("retrying turn/start as text-only after multimodal error: {err}"),
                        ));
                        input = build_turn_input(req, true);
                    }
                    Err(err) => return Err(err),
                }
            }

            let completion = session
                .wait_for(
                    |frame| frame.get("method").and_then(Value::as_str) == Some("turn/completed"),
                    |frame| {
                        if let Some(event) = classify_notification(frame, &redactor, &req.env) {
                            sink.publish(&event);
                        }
                    },
                )
                .await?;

            Ok::<Value, RuntimeError>(completion)
        };

        let completion = tokio::select! {
            _ = ctx.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Ok(RuntimeResult::new(
                    true,
                    -1,
                    ResultEnvelope::failed(req.run_id, req.task_id, "Run cancelled or timed out"),
                ));
            }
            result = run_future => result,
        };

        // The app-server thread is ephemeral; the run is over once we have
        // (or have failed to get) a completion, so tear the child down
        // instead of waiting for it to exit on its own.
        let _ = child.start_kill();
        let exit_status = child.wait().await.ok();
        let exit_code = exit_status.and_then(|s| s.code()).unwrap_or(-1) as i64;

        let stderr_tail = read_tail(stderr, STDERR_TAIL_BYTES).await;

        let envelope = match completion {
            Ok(frame) => {
                let status = frame.get("params").and_then(|p| p.get("status")).and_then(Value::as_str).unwrap_or("completed");
                if status == "completed" {
                    ResultEnvelope::succeeded(req.run_id, req.task_id, "Codex app-server execution completed")
                } else {
                    let error = frame
                        .get("params")
                        .and_then(|p| p.get("error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| stderr_tail.clone());
                    ResultEnvelope::failed(req.run_id, req.task_id, "Codex app-server reported a failed turn")
                        .with_error(error)
                }
            }
            Err(err) => ResultEnvelope::failed(req.run_id, req.task_id, "Codex app-server execution failed")
                .with_error(if stderr_tail.is_empty() { err.to_string() } else { stderr_tail.clone() }),
        };

        let envelope = envelope
            .with_metadata("runtime", "codex-app-server")
            .with_metadata("provider", "codex")
            .with_metadata("mode", req.mode.clone())
            .with_metadata("exitCode", exit_code.to_string());

        Ok(RuntimeResult::new(true, exit_code, envelope))
    }
}

/// Reads an already-exited child's stderr pipe to completion and returns
/// up to its last `max_bytes` bytes.
async fn read_tail(mut reader: impl tokio::io::AsyncRead + Unpin, max_bytes: usize) -> String {
    use tokio::io::AsyncReadExt;
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    let start = buf.len().saturating_sub(max_bytes);
    String::from_utf8_lossy(&buf[start..]).to_string()
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
