// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio_util::sync::CancellationToken;

/// Per-run context threaded through every [`crate::HarnessRuntime::run`]
/// call. Carries the cancellation token the executor uses to signal an
/// external cancel or a deadline expiry; runtimes race it against their
/// own subprocess/protocol wait points and kill the child process tree on
/// the cancelled branch.
#[derive(Clone)]
pub struct RunContext {
    cancellation: CancellationToken,
}

impl RunContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}
