// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use gw_core::RunId;

use super::*;

fn sample_spec() -> CreateSpec {
    CreateSpec {
        run_id: RunId::new(),
        image: "ghcr.io/example/claude-harness:latest".to_string(),
        cmd: vec!["run".to_string()],
        env: HashMap::new(),
        labels: HashMap::new(),
        workspace_host_path: None,
        artifacts_host_path: None,
        cpu_limit: 1.5,
        mem_limit_bytes: 2 * 1024 * 1024 * 1024,
        net_disabled: false,
        read_only_rootfs: false,
    }
}

#[test]
fn create_args_always_carries_orchestrator_and_run_id_labels() {
    let spec = sample_spec();
    let args = create_args(&spec);
    assert!(args.contains(&format!("{ORCHESTRATOR_LABEL}=true")));
    assert!(args.contains(&format!("{RUN_ID_LABEL}={}", spec.run_id)));
    assert!(args.contains(&spec.image));
}

#[test]
fn create_args_disables_network_and_mounts_read_only_when_requested() {
    let mut spec = sample_spec();
    spec.net_disabled = true;
    spec.read_only_rootfs = true;
    let args = create_args(&spec);
    assert!(args.windows(2).any(|w| w == ["--network".to_string(), "none".to_string()]));
    assert!(args.contains(&"--read-only".to_string()));
}

#[test]
fn create_args_mounts_workspace_and_artifacts_volumes() {
    let mut spec = sample_spec();
    spec.workspace_host_path = Some("/var/lib/gateway/workspaces/r/t".into());
    spec.artifacts_host_path = Some("/var/lib/gateway/artifacts/run-1".into());
    let args = create_args(&spec);
    assert!(args.iter().any(|a| a.contains(":/workspace")));
    assert!(args.iter().any(|a| a.contains(":/artifacts")));
}

#[test]
fn create_args_appends_custom_labels_on_top_of_required_ones() {
    let mut spec = sample_spec();
    spec.labels.insert("task_id".to_string(), "tsk-abc".to_string());
    let args = create_args(&spec);
    assert!(args.contains(&"task_id=tsk-abc".to_string()));
}

#[test]
fn classify_status_maps_docker_ps_status_prefixes() {
    assert_eq!(classify_status("Up 3 minutes"), ContainerState::Running);
    assert_eq!(classify_status("Created"), ContainerState::Created);
    assert_eq!(classify_status("Exited (0) 2 seconds ago"), ContainerState::Exited);
    assert_eq!(classify_status("Paused"), ContainerState::Unknown);
}

#[test]
fn parse_byte_size_handles_docker_suffixes() {
    assert_eq!(parse_byte_size("512MiB"), 512 * 1024 * 1024);
    assert_eq!(parse_byte_size("1.5GiB"), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
    assert_eq!(parse_byte_size("0B"), 0);
}

#[test]
fn parse_stats_reads_cpu_memory_and_io_fields() {
    let raw = r#"{"CPUPerc":"12.34%","MemPerc":"5.00%","MemUsage":"256MiB / 2GiB","NetIO":"1kB / 2kB","BlockIO":"3MB / 4MB"}"#;
    let metrics = parse_stats(raw).expect("valid stats json");
    assert!((metrics.cpu_percent - 12.34).abs() < f64::EPSILON);
    assert_eq!(metrics.mem_bytes, 256 * 1024 * 1024);
    assert_eq!(metrics.mem_limit_bytes, 2 * 1024 * 1024 * 1024);
    assert_eq!(metrics.net_rx_bytes, 1_000);
    assert_eq!(metrics.net_tx_bytes, 2_000);
    assert_eq!(metrics.block_read_bytes, 3_000_000);
    assert_eq!(metrics.block_write_bytes, 4_000_000);
}

#[test]
fn parse_stats_rejects_malformed_json() {
    assert!(parse_stats("not json").is_err());
}
