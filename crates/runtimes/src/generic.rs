// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::Stdio;

use async_trait::async_trait;
use gw_core::{HarnessRunRequest, ResultEnvelope};
use gw_redact::{PatternSet, Redactor};
use gw_wire::RunEventSink;
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout, Command};

use crate::context::RunContext;
use crate::error::RuntimeError;
use crate::result::RuntimeResult;
use crate::HarnessRuntime;

/// Output captured from a generic command run is truncated to this many
/// characters before being stored as envelope metadata.
const CAPTURE_TRUNCATE_CHARS: usize = 5_000;

/// Runs `sh -lc <command>` and builds an envelope from its exit code and
/// captured output -- the fallback used when a structured runtime isn't
/// available or fails.
pub struct GenericCommandRuntime;

impl GenericCommandRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericCommandRuntime {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_all(mut pipe: impl tokio::io::AsyncRead + Unpin) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    buf
}

fn truncate(text: &str) -> String {
    text.chars().take(CAPTURE_TRUNCATE_CHARS).collect()
}

#[async_trait]
impl HarnessRuntime for GenericCommandRuntime {
    fn name(&self) -> &'static str {
        "generic-command"
    }

    async fn run(
        &self,
        req: &HarnessRunRequest,
        _sink: &RunEventSink,
        ctx: &RunContext,
    ) -> Result<RuntimeResult, RuntimeError> {
        let redactor = Redactor::new(PatternSet::default());
        let command_line = req.custom_command.clone().unwrap_or_else(|| req.prompt.clone());

        let mut command = Command::new("sh");
        command.arg("-lc").arg(&command_line);
        command.envs(&req.env);
        if let Some(workspace) = &req.workspace_path {
            command.current_dir(workspace);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        let mut child = command.spawn()?;
        let stdout_pipe: ChildStdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stdout".to_string()))?;
        let stderr_pipe: ChildStderr = child
            .stderr
            .take()
            .ok_or_else(|| RuntimeError::Protocol("child process had no piped stderr".to_string()))?;

        let io_future = async move {
            let (stdout_bytes, stderr_bytes) = tokio::join!(read_all(stdout_pipe), read_all(stderr_pipe));
            (stdout_bytes, stderr_bytes)
        };

        let (stdout_bytes, stderr_bytes) = tokio::select! {
            _ = ctx.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Ok(RuntimeResult::new(
                    false,
                    -1,
                    ResultEnvelope::failed(req.run_id, req.task_id, "Run cancelled or timed out"),
                ));
            }
            result = io_future => result,
        };

        let status = child.wait().await.map_err(RuntimeError::Spawn)?;
        let exit_code = status.code().unwrap_or(-1) as i64;

        let stdout_text = String::from_utf8_lossy(&stdout_bytes).to_string();
        let stderr_text = String::from_utf8_lossy(&stderr_bytes).to_string();
        let redacted_stdout = redactor.redact(&stdout_text, &req.env);
        let redacted_stderr = redactor.redact(&stderr_text, &req.env);

        let mut envelope = match serde_json::from_str::<ResultEnvelope>(redacted_stdout.trim()) {
            Ok(adopted) => adopted,
            Err(_) => {
                let summary = if exit_code == 0 {
                    "Task completed".to_string()
                } else {
                    format!("Task failed (exit {exit_code})")
                };
                let status = if exit_code == 0 {
                    ResultEnvelope::succeeded(req.run_id, req.task_id, summary)
                } else {
                    ResultEnvelope::failed(req.run_id, req.task_id, summary)
                };
                status
                    .with_metadata("stdout", truncate(&redacted_stdout))
                    .with_metadata("stderr", truncate(&redacted_stderr))
            }
        };

        envelope = envelope
            .with_metadata("runtime", "generic-command")
            .with_metadata("mode", req.mode.clone())
            .with_metadata("exitCode", exit_code.to_string());

        Ok(RuntimeResult::new(false, exit_code, envelope))
    }
}

#[cfg(test)]
#[path = "generic_tests.rs"]
mod tests;
