// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use gw_core::HarnessRunRequest;
use gw_wire::RunEventSink;

use crate::context::RunContext;
use crate::error::RuntimeError;
use crate::result::RuntimeResult;

/// A way to drive one harness to completion for one run. Implementations
/// must: apply `req.timeout` as a linked deadline against `ctx`'s
/// cancellation; kill the entire child process tree when that deadline or
/// an external cancel fires; redact every piece of text they emit through
/// the request's own environment before handing it to `sink`; and return a
/// [`RuntimeResult`] whose envelope satisfies
/// [`gw_core::ResultEnvelope::is_valid_for_external_surfacing`].
#[async_trait]
pub trait HarnessRuntime: Send + Sync {
    async fn run(
        &self,
        req: &HarnessRunRequest,
        sink: &RunEventSink,
        ctx: &RunContext,
    ) -> Result<RuntimeResult, RuntimeError>;

    /// Stable identifier stamped into `metadata.runtimeName`, naming
    /// whichever runtime actually executed the run.
    fn name(&self) -> &'static str;
}
