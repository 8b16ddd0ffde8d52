// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Any git subprocess non-zero exit, wrapped with the operation name and
/// the tail of whichever stream carried the message. In prep this is
/// fatal; in finalize it demotes the run's envelope to failed with
/// `metadata.gitWorkflow=failed`.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("{op} failed (exit {exit_code}): {message}")]
    CommandFailed { op: String, exit_code: i32, message: String },

    #[error("{op} timed out after {timeout_secs}s")]
    Timeout { op: String, timeout_secs: u64 },

    #[error("failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),
}

impl GitError {
    pub fn command_failed(op: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::CommandFailed { op: op.into(), exit_code, message: message.into() }
    }
}
