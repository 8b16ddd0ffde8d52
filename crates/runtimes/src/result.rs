// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gw_core::ResultEnvelope;

/// What [`crate::HarnessRuntime::run`] returns. `structured` records
/// whether the runtime actually parsed its harness's native protocol
/// (`true` for Claude/Codex) or fell back to treating it as an opaque
/// command (`false` for the generic runtime) -- the executor uses this to
/// decide whether a structured-runtime failure should trigger the fallback
/// runtime rather than being surfaced directly.
#[derive(Debug, Clone)]
pub struct RuntimeResult {
    pub structured: bool,
    pub exit_code: i64,
    pub envelope: ResultEnvelope,
}

impl RuntimeResult {
    pub fn new(structured: bool, exit_code: i64, envelope: ResultEnvelope) -> Self {
        Self { structured, exit_code, envelope }
    }
}
