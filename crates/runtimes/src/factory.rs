// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`RuntimeFactory`]: selects the structured runtime (and its generic
//! fallback) for a request, and looks up the [`HarnessAdapter`] a harness
//! registers for post-run classification. Mirrors the routing-by-backend
//! split a container orchestrator uses for its own adapters, except the
//! axis here is harness identity rather than execution target.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use gw_core::{HarnessRunRequest, ResultEnvelope, RunStatus};

use crate::adapter::{ArtifactMap, FailureClassification, HarnessAdapter};
use crate::claude::ClaudeStreamRuntime;
use crate::codex::CodexAppServerRuntime;
use crate::generic::GenericCommandRuntime;
use crate::HarnessRuntime;

/// What a single run should be executed with: the structured runtime
/// matching the request's harness, an optional fallback (the generic
/// command runtime) to retry with on a non-cancellation failure, and the
/// resolved mode string stamped into the envelope's metadata.
#[derive(Clone)]
pub struct RuntimeSelection {
    pub primary: Arc<dyn HarnessRuntime>,
    pub fallback: Option<Arc<dyn HarnessRuntime>>,
    pub runtime_mode: String,
}

/// Built once at startup. Holds one structured runtime per known harness
/// and one adapter per known harness, plus the shared generic fallback
/// runtime and adapter used for everything else.
pub struct RuntimeFactory {
    structured: HashMap<&'static str, Arc<dyn HarnessRuntime>>,
    adapters: HashMap<&'static str, Arc<dyn HarnessAdapter>>,
    generic_runtime: Arc<dyn HarnessRuntime>,
    generic_adapter: Arc<dyn HarnessAdapter>,
}

impl RuntimeFactory {
    pub fn new() -> Self {
        let mut structured: HashMap<&'static str, Arc<dyn HarnessRuntime>> = HashMap::new();
        structured.insert("claude", Arc::new(ClaudeStreamRuntime::new()));
        structured.insert("codex", Arc::new(CodexAppServerRuntime::new()));

        let mut adapters: HashMap<&'static str, Arc<dyn HarnessAdapter>> = HashMap::new();
        adapters.insert("claude", Arc::new(ClaudeAdapter));
        adapters.insert("codex", Arc::new(CodexAdapter));

        Self {
            structured,
            adapters,
            generic_runtime: Arc::new(GenericCommandRuntime::new()),
            generic_adapter: Arc::new(GenericAdapter),
        }
    }

    /// A structured runtime matching `req.harness` is primary, with the
    /// generic command runtime as its fallback. A harness with no
    /// registered structured runtime runs directly on the generic runtime,
    /// which has no fallback of its own.
    pub fn select(&self, req: &HarnessRunRequest) -> RuntimeSelection {
        match self.structured.get(req.harness.as_str()) {
            Some(runtime) => RuntimeSelection {
                primary: runtime.clone(),
                fallback: Some(self.generic_runtime.clone()),
                runtime_mode: req.mode.clone(),
            },
            None => RuntimeSelection {
                primary: self.generic_runtime.clone(),
                fallback: None,
                runtime_mode: req.mode.clone(),
            },
        }
    }

    pub fn adapter_for(&self, harness: &str) -> Arc<dyn HarnessAdapter> {
        self.adapters.get(harness).cloned().unwrap_or_else(|| self.generic_adapter.clone())
    }
}

impl Default for RuntimeFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Categorizes a failed envelope's `error` text by case-insensitive
/// substring, the same style [`crate::claude::normalize_status`] uses for
/// stream status words.
fn categorize_error(error: &str) -> FailureClassification {
    let lower = error.to_ascii_lowercase();
    if lower.contains("cancel") || lower.contains("timed out") {
        FailureClassification::new("timeout", error)
    } else if lower.contains("workspace") || lower.contains("git") {
        FailureClassification::new("workspace_error", error)
    } else {
        FailureClassification::new("harness_error", error)
    }
}

fn classify_by_status(envelope: &ResultEnvelope) -> FailureClassification {
    match envelope.status {
        RunStatus::Failed => categorize_error(&envelope.error),
        _ => FailureClassification::none(),
    }
}

struct ClaudeAdapter;

impl HarnessAdapter for ClaudeAdapter {
    fn classify_failure(&self, envelope: &ResultEnvelope) -> FailureClassification {
        classify_by_status(envelope)
    }

    fn map_artifacts(&self, _req: &HarnessRunRequest) -> ArtifactMap {
        ArtifactMap::empty()
    }
}

struct CodexAdapter;

impl HarnessAdapter for CodexAdapter {
    fn prepare_context(&self, _req: &HarnessRunRequest, _workspace_path: &Path) {}

    fn classify_failure(&self, envelope: &ResultEnvelope) -> FailureClassification {
        classify_by_status(envelope)
    }

    fn map_artifacts(&self, _req: &HarnessRunRequest) -> ArtifactMap {
        ArtifactMap::empty()
    }
}

struct GenericAdapter;

impl HarnessAdapter for GenericAdapter {
    fn classify_failure(&self, envelope: &ResultEnvelope) -> FailureClassification {
        classify_by_status(envelope)
    }

    fn map_artifacts(&self, _req: &HarnessRunRequest) -> ArtifactMap {
        ArtifactMap::empty()
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
