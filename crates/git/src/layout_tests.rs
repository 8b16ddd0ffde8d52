// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn sanitize_replaces_path_separators() {
    assert_eq!(sanitize("acme/repo"), "acme-repo");
    assert_eq!(sanitize("acme\\repo"), "acme-repo");
}

#[test]
fn sanitize_empty_becomes_unknown() {
    assert_eq!(sanitize(""), "unknown");
}

#[test]
fn sanitize_leaves_plain_names_alone() {
    assert_eq!(sanitize("my-task-123"), "my-task-123");
}

#[test]
fn workspace_path_follows_the_documented_layout() {
    let path = workspace_path(Path::new("/data/workspaces"), "acme/repo", "t/1");
    assert_eq!(path, PathBuf::from("/data/workspaces/acme-repo/tasks/t-1"));
}
