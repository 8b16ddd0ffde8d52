// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Top-level error taxonomy for the gateway. Every variant maps to a
/// specific externally-surfaced failure mode; the executor never lets one
/// of these escape as a panic -- they're always folded into a
/// [`gw_core::ResultEnvelope`] or, for admission-time failures, returned
/// synchronously to the caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request validation failed: {0}")]
    Validation(#[from] gw_core::ValidationError),

    #[error("image {image:?} is not on the allow-list")]
    ImageNotAllowed { image: String },

    #[error("queue is full")]
    Rejected,

    #[error("run_id {0} is already active")]
    Duplicate(gw_core::RunId),

    #[error("git workspace error: {0}")]
    Git(#[from] gw_git::GitError),

    #[error("container runtime error: {0}")]
    ContainerRuntimeError(#[from] gw_container::ContainerError),

    #[error(transparent)]
    Runtime(#[from] gw_runtimes::RuntimeError),
}
