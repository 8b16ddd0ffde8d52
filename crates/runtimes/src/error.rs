// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Propagated only for non-cancellation failures; cancellation is
/// communicated through [`crate::context::RunContext`] and handled by the
/// executor, not raised as an error.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to spawn harness process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("harness protocol error: {0}")]
    Protocol(String),

    #[error("run timed out after {0:?}")]
    Timeout(std::time::Duration),
}
