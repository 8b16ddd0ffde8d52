// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::PathBuf;

use gw_core::RunId;
use serde::Deserialize;

/// Parameters for [`crate::ContainerBackend::create`]. The backend always
/// attaches `orchestrator=true` and `run_id=<run_id>` on top of `labels`,
/// regardless of what the caller passes here.
#[derive(Debug, Clone)]
pub struct CreateSpec {
    pub run_id: RunId,
    pub image: String,
    pub cmd: Vec<String>,
    pub env: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub workspace_host_path: Option<PathBuf>,
    pub artifacts_host_path: Option<PathBuf>,
    pub cpu_limit: f64,
    pub mem_limit_bytes: u64,
    pub net_disabled: bool,
    pub read_only_rootfs: bool,
}

/// `docker stats --no-stream --format json` results, normalised.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerMetrics {
    pub cpu_percent: f64,
    pub mem_bytes: u64,
    pub mem_limit_bytes: u64,
    pub mem_percent: f64,
    pub net_rx_bytes: u64,
    pub net_tx_bytes: u64,
    pub block_read_bytes: u64,
    pub block_write_bytes: u64,
}
