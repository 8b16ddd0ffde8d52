// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Propagated by the executor as a `RuntimeError`; any mid-flight container
/// is removed on the error path.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("failed to exec docker: {0}")]
    Exec(#[from] std::io::Error),

    #[error("docker {op} failed: {message}")]
    CommandFailed { op: String, message: String },

    #[error("failed to parse docker output for {op}: {message}")]
    MalformedOutput { op: String, message: String },
}

impl ContainerError {
    pub fn command_failed(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed { op: op.into(), message: message.into() }
    }
}
