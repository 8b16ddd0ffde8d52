// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`GitWorkspaceManager`]: prep and finalize protocols for a per-task git
//! workspace, serialized per `(repo_id, task_id)`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use gw_core::{RunId, TaskId};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

use crate::error::GitError;
use crate::layout::workspace_path;
use crate::locks::GitLockTable;
use crate::subprocess::{run_git, run_git_checked, DEFAULT_GIT_TIMEOUT};
use gw_core::WorkspaceContext;

/// What finalize concluded, folded into the run's envelope metadata by the
/// executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The run's own status was not `succeeded`; `metadata.gitWorkflow`
    /// should be set to `"skipped/non-success-run"`.
    Skipped,
    /// `git status --porcelain` was empty, or the commit produced no new
    /// HEAD -- the run is still successful but made no changes.
    Obsolete,
    /// Commit and push both succeeded.
    Pushed,
    /// A git operation failed; the envelope should be demoted to
    /// `{status: failed, summary: "Git commit/push failed"}`.
    Failed { reason: String },
}

/// Held by the caller for the duration of prep and finalize, guaranteeing
/// the per-`(repo,task)` invariant from the concurrency model.
pub struct WorkspaceLock {
    pub context: WorkspaceContext,
    _guard: OwnedMutexGuard<()>,
}

pub struct GitWorkspaceManager {
    workspaces_root: std::path::PathBuf,
    locks: Arc<GitLockTable>,
}

impl GitWorkspaceManager {
    pub fn new(workspaces_root: impl Into<std::path::PathBuf>) -> Self {
        Self { workspaces_root: workspaces_root.into(), locks: Arc::new(GitLockTable::new()) }
    }

    fn main_branch(env: &HashMap<String, String>, requested_branch: Option<&str>) -> String {
        env.get("DEFAULT_BRANCH")
            .cloned()
            .or_else(|| requested_branch.map(str::to_string))
            .unwrap_or_else(|| "main".to_string())
    }

    /// Prep protocol (§4.4): clone-or-reuse, fetch, checkout main, hard
    /// reset to origin, clean, record `head_before_run`.
    pub async fn ensure_workspace_ready(
        &self,
        repo_id: &str,
        task_id: &str,
        clone_url: &str,
        requested_branch: Option<&str>,
        env: &HashMap<String, String>,
    ) -> Result<WorkspaceLock, GitError> {
        let guard = self.locks.lock(repo_id, task_id).await;
        let path = workspace_path(&self.workspaces_root, repo_id, task_id);
        let main = Self::main_branch(env, requested_branch);

        if !path.join(".git").exists() {
            if path.exists() {
                tokio::fs::remove_dir_all(&path).await.map_err(GitError::Spawn)?;
            }
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(GitError::Spawn)?;
            }
            clone(clone_url, &path).await?;
        }

        run_git_checked(&["remote", "set-url", "origin", clone_url], &path, DEFAULT_GIT_TIMEOUT, "git remote set-url")
            .await?;
        run_git_checked(&["fetch", "--prune", "origin"], &path, DEFAULT_GIT_TIMEOUT, "git fetch").await?;
        checkout_main(&path, &main).await?;
        run_git_checked(
            &["reset", "--hard", &format!("origin/{main}")],
            &path,
            DEFAULT_GIT_TIMEOUT,
            "git reset --hard",
        )
        .await?;
        run_git_checked(&["clean", "-fd"], &path, DEFAULT_GIT_TIMEOUT, "git clean").await?;

        let head = run_git_checked(&["rev-parse", "HEAD"], &path, DEFAULT_GIT_TIMEOUT, "git rev-parse HEAD").await?;
        let head_before_run = String::from_utf8_lossy(&head.stdout).trim().to_string();

        info!(repo_id, task_id, main_branch = %main, %head_before_run, "workspace ready");

        Ok(WorkspaceLock {
            context: WorkspaceContext::new(path, main, head_before_run),
            _guard: guard,
        })
    }

    /// Finalize protocol (§4.4). Only meaningful when `run_succeeded`;
    /// otherwise returns [`FinalizeOutcome::Skipped`] without touching the
    /// workspace.
    pub async fn finalize(
        &self,
        lock: &WorkspaceLock,
        task_id: &TaskId,
        run_id: &RunId,
        run_succeeded: bool,
        env: &HashMap<String, String>,
    ) -> FinalizeOutcome {
        if !run_succeeded {
            return FinalizeOutcome::Skipped;
        }

        match self.finalize_inner(lock, task_id, run_id, env).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "git finalize failed");
                FinalizeOutcome::Failed { reason: "Git commit/push failed".to_string() }
            }
        }
    }

    async fn finalize_inner(
        &self,
        lock: &WorkspaceLock,
        task_id: &TaskId,
        run_id: &RunId,
        env: &HashMap<String, String>,
    ) -> Result<FinalizeOutcome, GitError> {
        let path = &lock.context.workspace_path;
        let main = &lock.context.main_branch;

        checkout_main(path, main).await?;

        let status =
            run_git_checked(&["status", "--porcelain"], path, DEFAULT_GIT_TIMEOUT, "git status").await?;
        if status.stdout.is_empty() {
            return Ok(FinalizeOutcome::Obsolete);
        }

        run_git_checked(&["add", "-A"], path, DEFAULT_GIT_TIMEOUT, "git add").await?;

        let (name, email) = commit_identity(env);
        let message = format!("agent task {task_id}: run {run_id}");
        let commit = run_git(
            &[
                "-c",
                &format!("user.name={name}"),
                "-c",
                &format!("user.email={email}"),
                "commit",
                "-m",
                &message,
            ],
            path,
            DEFAULT_GIT_TIMEOUT,
            "git commit",
        )
        .await?;
        if !commit.status.success() {
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&commit.stdout),
                String::from_utf8_lossy(&commit.stderr)
            );
            if !combined.contains("nothing to commit") && !combined.contains("no changes added to commit") {
                return Err(GitError::command_failed(
                    "git commit",
                    commit.status.code().unwrap_or(-1),
                    combined.trim().to_string(),
                ));
            }
        }

        let head_after = run_git_checked(&["rev-parse", "HEAD"], path, DEFAULT_GIT_TIMEOUT, "git rev-parse HEAD")
            .await?;
        let head_after = String::from_utf8_lossy(&head_after.stdout).trim().to_string();
        if head_after == lock.context.head_before_run {
            return Ok(FinalizeOutcome::Obsolete);
        }

        run_git_checked(&["push", "origin", main], path, DEFAULT_GIT_TIMEOUT, "git push").await?;
        Ok(FinalizeOutcome::Pushed)
    }
}

async fn clone(clone_url: &str, path: &Path) -> Result<(), GitError> {
    run_git_checked(&["clone", clone_url, &path.display().to_string()], Path::new("."), DEFAULT_GIT_TIMEOUT, "git clone")
        .await?;
    Ok(())
}

async fn checkout_main(path: &Path, main: &str) -> Result<(), GitError> {
    let checkout = run_git(&["checkout", main], path, DEFAULT_GIT_TIMEOUT, "git checkout").await?;
    if checkout.status.success() {
        return Ok(());
    }
    run_git_checked(
        &["checkout", "-B", main, &format!("origin/{main}")],
        path,
        DEFAULT_GIT_TIMEOUT,
        "git checkout -B",
    )
    .await?;
    Ok(())
}

fn commit_identity(env: &HashMap<String, String>) -> (String, String) {
    let name = env
        .get("GIT_COMMITTER_NAME")
        .or_else(|| env.get("GIT_AUTHOR_NAME"))
        .cloned()
        .unwrap_or_else(|| "AgentsDashboard Bot".to_string());
    let email = env
        .get("GIT_COMMITTER_EMAIL")
        .or_else(|| env.get("GIT_AUTHOR_EMAIL"))
        .cloned()
        .unwrap_or_else(|| "agentsdashboard-bot@local".to_string());
    (name, email)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
