// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ResultEnvelope`]: the normalised record a harness run produces.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ids::{RunId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
    Cancelled,
    Pending,
}

crate::simple_display! {
    RunStatus {
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
        Pending => "pending",
    }
}

/// A suggested follow-up surfaced alongside the run's result, e.g. a link
/// to open a PR or view a diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(rename = "type")]
    pub action_type: String,
    pub description: String,
    pub target: String,
}

/// The normalised result of one run. Every envelope surfaced externally
/// must have a non-empty `status` and `summary`; a failed validation
/// substitutes a synthetic `failed / validation` envelope instead of
/// letting an incomplete one escape (see [`ResultEnvelope::validation_failure`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub run_id: RunId,
    pub task_id: TaskId,
    pub status: RunStatus,
    pub summary: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub artifacts: Vec<PathBuf>,
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub actions: Vec<ActionItem>,
}

impl ResultEnvelope {
    pub fn new(run_id: RunId, task_id: TaskId, status: RunStatus, summary: impl Into<String>) -> Self {
        Self {
            run_id,
            task_id,
            status,
            summary: summary.into(),
            error: String::new(),
            artifacts: Vec::new(),
            metrics: HashMap::new(),
            metadata: HashMap::new(),
            actions: Vec::new(),
        }
    }

    pub fn succeeded(run_id: RunId, task_id: TaskId, summary: impl Into<String>) -> Self {
        Self::new(run_id, task_id, RunStatus::Succeeded, summary)
    }

    pub fn failed(run_id: RunId, task_id: TaskId, summary: impl Into<String>) -> Self {
        Self::new(run_id, task_id, RunStatus::Failed, summary)
    }

    /// The envelope substituted whenever validation of a runtime-produced
    /// envelope fails (non-empty `status`/`summary` invariant).
    pub fn validation_failure(run_id: RunId, task_id: TaskId, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut envelope = Self::failed(run_id, task_id, "Run produced an invalid result");
        envelope.error = reason;
        envelope
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True iff this envelope satisfies the external-surfacing invariant:
    /// non-empty status (always true for this enum) and non-empty summary.
    pub fn is_valid_for_external_surfacing(&self) -> bool {
        !self.summary.is_empty()
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
