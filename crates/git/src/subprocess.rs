// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buffered git subprocess runner. Every invocation strips `GIT_DIR` and
//! `GIT_WORK_TREE` from the child's environment so the gateway process's
//! own ambient git state (if any) never leaks into a managed clone.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use crate::error::GitError;

pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Run `git <args>` in `cwd`, waiting at most `timeout`. Returns the raw
/// `Output` regardless of exit status; callers decide how to interpret a
/// non-zero exit (fatal in prep, tolerated for "nothing to commit" in
/// finalize).
pub async fn run_git(args: &[&str], cwd: &Path, timeout: Duration, op: &str) -> Result<Output, GitError> {
    let mut cmd = tokio::process::Command::new("git");
    cmd.args(args).current_dir(cwd).env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(GitError::Spawn(io_err)),
        Err(_elapsed) => Err(GitError::Timeout { op: op.to_string(), timeout_secs: timeout.as_secs() }),
    }
}

/// Run `git <args>`, returning `Err` if the exit was non-zero.
pub async fn run_git_checked(args: &[&str], cwd: &Path, timeout: Duration, op: &str) -> Result<Output, GitError> {
    let output = run_git(args, cwd, timeout, op).await?;
    if !output.status.success() {
        return Err(GitError::command_failed(op, output.status.code().unwrap_or(-1), tail(&output)));
    }
    Ok(output)
}

fn tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
