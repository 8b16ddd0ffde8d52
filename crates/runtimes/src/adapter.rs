// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::Path;

use gw_core::{HarnessRunRequest, ResultEnvelope};

/// What the executor's envelope post-processing asks a harness for, after
/// a run completes: how to classify a failure for metadata purposes, and
/// which workspace paths the executor should treat as artifacts before
/// applying the run's `ArtifactPolicy`.
#[derive(Debug, Clone, Default)]
pub struct FailureClassification {
    /// Short machine-facing category, e.g. `"timeout"`, `"harness_error"`,
    /// `"workspace_error"`, or empty when the run did not fail.
    pub category: String,
    pub detail: String,
}

impl FailureClassification {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(category: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { category: category.into(), detail: detail.into() }
    }
}

/// Relative workspace paths a harness adapter wants surfaced as artifacts,
/// keyed by a stable logical name (e.g. `"diff"`, `"log"`).
#[derive(Debug, Clone, Default)]
pub struct ArtifactMap {
    pub paths: HashMap<String, String>,
}

impl ArtifactMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        self.paths.insert(name.into(), relative_path.into());
        self
    }
}

/// One adapter per harness (`claude`, `codex`, and the generic fallback),
/// selected by the factory's registry. Mirrors the routing-by-backend
/// split a container orchestrator uses, except the axis here is harness
/// identity rather than execution target.
pub trait HarnessAdapter: Send + Sync {
    /// Harness-specific context preparation that happens before the
    /// runtime is invoked, e.g. writing a settings file into the
    /// workspace. A no-op for harnesses that need nothing extra.
    fn prepare_context(&self, _req: &HarnessRunRequest, _workspace_path: &Path) {}

    fn classify_failure(&self, envelope: &ResultEnvelope) -> FailureClassification;

    fn map_artifacts(&self, req: &HarnessRunRequest) -> ArtifactMap;
}
