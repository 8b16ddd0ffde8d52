// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Command as StdCommand;
use tempfile::tempdir;

fn git(args: &[&str], cwd: &Path) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {args:?} failed");
}

/// Build a bare "origin" repo with a single commit on `main`.
fn make_origin() -> tempfile::TempDir {
    let origin = tempdir().unwrap();
    git(&["init", "--bare", "-b", "main"], origin.path());

    let seed = tempdir().unwrap();
    git(&["clone", &origin.path().display().to_string(), "."], seed.path());
    std::fs::write(seed.path().join("README.md"), "hello\n").unwrap();
    git(&["add", "-A"], seed.path());
    git(&["commit", "-m", "seed"], seed.path());
    git(&["push", "origin", "main"], seed.path());

    origin
}

#[tokio::test]
async fn ensure_workspace_ready_clones_and_records_head() {
    let origin = make_origin();
    let workspaces_root = tempdir().unwrap();
    let manager = GitWorkspaceManager::new(workspaces_root.path());

    let lock = manager
        .ensure_workspace_ready(
            "acme/repo",
            "task-1",
            &origin.path().display().to_string(),
            Some("main"),
            &HashMap::new(),
        )
        .await
        .unwrap();

    assert!(lock.context.workspace_path.join("README.md").exists());
    assert_eq!(lock.context.main_branch, "main");
    assert!(!lock.context.head_before_run.is_empty());
}

#[tokio::test]
async fn finalize_is_skipped_for_a_non_successful_run() {
    let origin = make_origin();
    let workspaces_root = tempdir().unwrap();
    let manager = GitWorkspaceManager::new(workspaces_root.path());
    let lock = manager
        .ensure_workspace_ready("acme/repo", "task-1", &origin.path().display().to_string(), None, &HashMap::new())
        .await
        .unwrap();

    let outcome = manager.finalize(&lock, &TaskId::new(), &RunId::new(), false, &HashMap::new()).await;
    assert_eq!(outcome, FinalizeOutcome::Skipped);
}

#[tokio::test]
async fn finalize_with_no_diff_is_obsolete() {
    let origin = make_origin();
    let workspaces_root = tempdir().unwrap();
    let manager = GitWorkspaceManager::new(workspaces_root.path());
    let lock = manager
        .ensure_workspace_ready("acme/repo", "task-1", &origin.path().display().to_string(), None, &HashMap::new())
        .await
        .unwrap();

    let outcome = manager.finalize(&lock, &TaskId::new(), &RunId::new(), true, &HashMap::new()).await;
    assert_eq!(outcome, FinalizeOutcome::Obsolete);
}

#[tokio::test]
async fn finalize_with_a_diff_commits_and_pushes() {
    let origin = make_origin();
    let workspaces_root = tempdir().unwrap();
    let manager = GitWorkspaceManager::new(workspaces_root.path());
    let lock = manager
        .ensure_workspace_ready("acme/repo", "task-1", &origin.path().display().to_string(), None, &HashMap::new())
        .await
        .unwrap();

    std::fs::write(lock.context.workspace_path.join("new_file.txt"), "content\n").unwrap();

    let mut env = HashMap::new();
    env.insert("GIT_COMMITTER_NAME".to_string(), "Runner".to_string());
    env.insert("GIT_COMMITTER_EMAIL".to_string(), "runner@example.com".to_string());

    let outcome = manager.finalize(&lock, &TaskId::from_string("t1"), &RunId::from_string("r1"), true, &env).await;
    assert_eq!(outcome, FinalizeOutcome::Pushed);

    let log = StdCommand::new("git")
        .args(["log", "-1", "--pretty=%s"])
        .current_dir(&lock.context.workspace_path)
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&log.stdout).trim(), "agent task t1: run r1");
}
