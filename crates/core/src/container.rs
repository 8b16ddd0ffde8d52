// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`OrchestratorContainer`]: a container derived from orchestrator labels.

use serde::{Deserialize, Serialize};

use crate::ids::RunId;

/// Label key every container created by this gateway carries, set to
/// `"true"`, used by the reconciler to distinguish gateway containers from
/// unrelated ones on the same host.
pub const ORCHESTRATOR_LABEL: &str = "orchestrator";
/// Label key carrying the owning run's id.
pub const RUN_ID_LABEL: &str = "run_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Created,
    Running,
    Exited,
    Unknown,
}

/// `(container_id, run_id, state)`, derived from container labels
/// `orchestrator=true, run_id=<id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorContainer {
    pub container_id: String,
    pub run_id: RunId,
    pub state: ContainerState,
}

impl OrchestratorContainer {
    pub fn new(container_id: impl Into<String>, run_id: RunId, state: ContainerState) -> Self {
        Self { container_id: container_id.into(), run_id, state }
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
