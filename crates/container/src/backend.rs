// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ContainerBackend`]: the container runtime contract the gateway drives.
//! A `docker` CLI implementation lives in [`crate::docker_cli`]; the trait
//! exists so a future in-process OCI client can be swapped in without
//! touching callers.

use async_trait::async_trait;
use gw_core::OrchestratorContainer;

use crate::error::ContainerError;
use crate::types::{ContainerMetrics, CreateSpec};

/// All operations are asynchronous and expected to be cancellation-safe:
/// dropping the future must not leave the underlying container in an
/// inconsistent bookkeeping state (the container itself may keep running;
/// the reconciler will pick it up as an orphan if nothing ever calls
/// `remove`).
#[async_trait]
pub trait ContainerBackend: Send + Sync {
    /// Create (but do not start) a container. Required labels include
    /// `orchestrator=true` and `run_id=<id>`, merged with `spec.labels`.
    async fn create(&self, spec: &CreateSpec) -> Result<String, ContainerError>;

    async fn start(&self, container_id: &str) -> Result<(), ContainerError>;

    /// Block until the container exits, returning its exit code.
    async fn wait_for_exit(&self, container_id: &str) -> Result<i64, ContainerError>;

    async fn get_logs(&self, container_id: &str) -> Result<String, ContainerError>;

    /// Stream log bytes to `on_chunk` as they arrive. The stream ends when
    /// the container terminates; the backend must not block waiting for
    /// termination to flush already-buffered logs.
    async fn stream_logs(
        &self,
        container_id: &str,
        on_chunk: &(dyn Fn(Vec<u8>) + Send + Sync),
    ) -> Result<(), ContainerError>;

    async fn stats(&self, container_id: &str) -> Result<ContainerMetrics, ContainerError>;

    async fn remove(&self, container_id: &str) -> Result<(), ContainerError>;

    /// Remove, ignoring whether the container is still running.
    async fn remove_force(&self, container_id: &str) -> Result<(), ContainerError>;

    /// List every container carrying `orchestrator=true`, regardless of
    /// its run-id's current liveness -- the reconciler decides which of
    /// these are orphans.
    async fn list_orchestrator_containers(&self) -> Result<Vec<OrchestratorContainer>, ContainerError>;

    /// Liveness check against the daemon itself, independent of any
    /// container. Used by the health loop; callers apply their own
    /// per-ping deadline.
    async fn ping(&self) -> Result<(), ContainerError>;
}
