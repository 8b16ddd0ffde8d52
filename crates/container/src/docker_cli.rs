// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::Stdio;

use async_trait::async_trait;
use gw_core::{ContainerState, OrchestratorContainer, RunId, ORCHESTRATOR_LABEL, RUN_ID_LABEL};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::warn;

use crate::backend::ContainerBackend;
use crate::error::ContainerError;
use crate::types::{ContainerMetrics, CreateSpec};

/// Drives the container runtime by shelling out to the `docker` binary on
/// `PATH`, the same way the rest of this gateway treats git: no daemon
/// client library, just subprocesses and parsed stdout.
pub struct DockerCliBackend {
    binary: String,
}

impl DockerCliBackend {
    pub fn new() -> Self {
        Self { binary: "docker".to_string() }
    }

    /// Override the binary name/path, primarily for tests that stub it out.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    async fn run(&self, op: &str, args: &[String]) -> Result<String, ContainerError> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContainerError::command_failed(op, stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for DockerCliBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn create_args(spec: &CreateSpec) -> Vec<String> {
    let mut args = vec!["create".to_string()];

    args.push("--label".to_string());
    args.push(format!("{ORCHESTRATOR_LABEL}=true"));
    args.push("--label".to_string());
    args.push(format!("{RUN_ID_LABEL}={}", spec.run_id));
    for (key, value) in &spec.labels {
        args.push("--label".to_string());
        args.push(format!("{key}={value}"));
    }

    for (key, value) in &spec.env {
        args.push("--env".to_string());
        args.push(format!("{key}={value}"));
    }

    args.push("--cpus".to_string());
    args.push(format!("{}", spec.cpu_limit));
    args.push("--memory".to_string());
    args.push(spec.mem_limit_bytes.to_string());

    if spec.net_disabled {
        args.push("--network".to_string());
        args.push("none".to_string());
    }
    if spec.read_only_rootfs {
        args.push("--read-only".to_string());
    }

    if let Some(path) = &spec.workspace_host_path {
        args.push("--volume".to_string());
        args.push(format!("{}:/workspace", path.display()));
    }
    if let Some(path) = &spec.artifacts_host_path {
        args.push("--volume".to_string());
        args.push(format!("{}:/artifacts", path.display()));
    }

    args.push(spec.image.clone());
    args.extend(spec.cmd.iter().cloned());
    args
}

#[async_trait]
impl ContainerBackend for DockerCliBackend {
    async fn create(&self, spec: &CreateSpec) -> Result<String, ContainerError> {
        let args = create_args(spec);
        self.run("create", &args).await
    }

    async fn start(&self, container_id: &str) -> Result<(), ContainerError> {
        self.run("start", &["start".to_string(), container_id.to_string()]).await?;
        Ok(())
    }

    async fn wait_for_exit(&self, container_id: &str) -> Result<i64, ContainerError> {
        let stdout = self.run("wait", &["wait".to_string(), container_id.to_string()]).await?;
        stdout.parse::<i64>().map_err(|err| {
            ContainerError::MalformedOutput { op: "wait".to_string(), message: err.to_string() }
        })
    }

    async fn get_logs(&self, container_id: &str) -> Result<String, ContainerError> {
        self.run("logs", &["logs".to_string(), container_id.to_string()]).await
    }

    async fn stream_logs(
        &self,
        container_id: &str,
        on_chunk: &(dyn Fn(Vec<u8>) + Send + Sync),
    ) -> Result<(), ContainerError> {
        let mut child = Command::new(&self.binary)
            .args(["logs", "-f", container_id])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ContainerError::command_failed("logs", "child process had no piped stdout")
        })?;
        let mut reader = BufReader::new(stdout).lines();
        while let Some(line) = reader.next_line().await? {
            let mut chunk = line.into_bytes();
            chunk.push(b'\n');
            on_chunk(chunk);
        }

        let status = child.wait().await?;
        if !status.success() {
            warn!(container_id, "docker logs -f exited non-zero after streaming");
        }
        Ok(())
    }

    async fn stats(&self, container_id: &str) -> Result<ContainerMetrics, ContainerError> {
        let stdout = self
            .run(
                "stats",
                &[
                    "stats".to_string(),
                    "--no-stream".to_string(),
                    "--format".to_string(),
                    "{{json .}}".to_string(),
                    container_id.to_string(),
                ],
            )
            .await?;
        parse_stats(&stdout)
    }

    async fn remove(&self, container_id: &str) -> Result<(), ContainerError> {
        self.run("rm", &["rm".to_string(), container_id.to_string()]).await?;
        Ok(())
    }

    async fn remove_force(&self, container_id: &str) -> Result<(), ContainerError> {
        self.run("rm", &["rm".to_string(), "-f".to_string(), container_id.to_string()]).await?;
        Ok(())
    }

    async fn list_orchestrator_containers(&self) -> Result<Vec<OrchestratorContainer>, ContainerError> {
        let stdout = self
            .run(
                "ps",
                &[
                    "ps".to_string(),
                    "--all".to_string(),
                    "--filter".to_string(),
                    format!("label={ORCHESTRATOR_LABEL}=true"),
                    "--format".to_string(),
                    "{{.ID}}\t{{.Status}}\t{{.Label \"run_id\"}}".to_string(),
                ],
            )
            .await?;

        let mut containers = Vec::new();
        for line in stdout.lines() {
            let mut parts = line.splitn(3, '\t');
            let (Some(id), Some(status), Some(run_id)) = (parts.next(), parts.next(), parts.next()) else {
                continue;
            };
            if run_id.is_empty() {
                continue;
            }
            let run_id = RunId::from_string(run_id);
            containers.push(OrchestratorContainer::new(id.to_string(), run_id, classify_status(status)));
        }
        Ok(containers)
    }

    async fn ping(&self) -> Result<(), ContainerError> {
        self.run("version", &["version".to_string(), "--format".to_string(), "{{.Server.Version}}".to_string()])
            .await?;
        Ok(())
    }
}

fn classify_status(status: &str) -> ContainerState {
    let lowered = status.to_ascii_lowercase();
    if lowered.starts_with("up") {
        ContainerState::Running
    } else if lowered.starts_with("created") {
        ContainerState::Created
    } else if lowered.starts_with("exited") {
        ContainerState::Exited
    } else {
        ContainerState::Unknown
    }
}

fn parse_stats(raw: &str) -> Result<ContainerMetrics, ContainerError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|err| {
        ContainerError::MalformedOutput { op: "stats".to_string(), message: err.to_string() }
    })?;

    let cpu_percent = parse_percent(value.get("CPUPerc"));
    let mem_percent = parse_percent(value.get("MemPerc"));
    let (mem_bytes, mem_limit_bytes) = parse_usage_pair(value.get("MemUsage"));
    let (net_rx_bytes, net_tx_bytes) = parse_usage_pair(value.get("NetIO"));
    let (block_read_bytes, block_write_bytes) = parse_usage_pair(value.get("BlockIO"));

    Ok(ContainerMetrics {
        cpu_percent,
        mem_bytes,
        mem_limit_bytes,
        mem_percent,
        net_rx_bytes,
        net_tx_bytes,
        block_read_bytes,
        block_write_bytes,
    })
}

fn parse_percent(value: Option<&serde_json::Value>) -> f64 {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| s.trim_end_matches('%').parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn parse_usage_pair(value: Option<&serde_json::Value>) -> (u64, u64) {
    let Some(text) = value.and_then(|v| v.as_str()) else {
        return (0, 0);
    };
    let Some((used, limit)) = text.split_once(" / ") else {
        return (0, 0);
    };
    (parse_byte_size(used), parse_byte_size(limit))
}

/// Parses docker's human-readable byte sizes, e.g. "512MiB" or "1.2GB".
fn parse_byte_size(text: &str) -> u64 {
    let text = text.trim();
    let split_at = text.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(text.len());
    let (number, unit) = text.split_at(split_at);
    let Ok(number) = number.parse::<f64>() else {
        return 0;
    };
    let multiplier = match unit.trim() {
        "B" | "" => 1.0,
        "kB" => 1_000.0,
        "KiB" => 1_024.0,
        "MB" => 1_000_000.0,
        "MiB" => 1_024.0 * 1_024.0,
        "GB" => 1_000_000_000.0,
        "GiB" => 1_024.0 * 1_024.0 * 1_024.0,
        _ => 1.0,
    };
    (number * multiplier) as u64
}

#[cfg(test)]
#[path = "docker_cli_tests.rs"]
mod tests;
