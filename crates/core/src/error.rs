// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error types that cross crate boundaries.
//!
//! Component-specific failures (git, container, runtime) live in their own
//! crates and get folded into a [`ResultEnvelope`](crate::result::ResultEnvelope)
//! by the executor; these two are the ones every crate needs a name for.

use thiserror::Error;

/// A request failed admission or envelope validation before any work ran.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("run_id must not be empty")]
    EmptyRunId,
    #[error("unknown harness {0:?}")]
    UnknownHarness(String),
    #[error("runtime produced an empty envelope")]
    EmptyEnvelope,
    #[error("{0}")]
    Other(String),
}

/// Why a run was cancelled. Both sub-kinds collapse to the same external
/// envelope (`failed`, `"Run cancelled or timed out"`) but are kept distinct
/// internally for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The control plane (or service shutdown) requested cancellation.
    ExternalCancel,
    /// The request's own timeout deadline elapsed.
    Timeout,
}

crate::simple_display! {
    CancellationReason {
        ExternalCancel => "external cancel",
        Timeout => "timeout",
    }
}

#[derive(Debug, Clone, Copy, Error)]
#[error("run cancelled or timed out ({reason})")]
pub struct Cancellation {
    pub reason: CancellationReason,
}

impl Cancellation {
    pub fn external() -> Self {
        Self { reason: CancellationReason::ExternalCancel }
    }

    pub fn timeout() -> Self {
        Self { reason: CancellationReason::Timeout }
    }
}
