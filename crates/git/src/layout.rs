// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace directory layout: `<workspaces_root>/<sanitized_repo_id>/tasks/<sanitized_task_id>`.

use std::path::{Path, PathBuf};

/// Replace path separators with `-`; an empty result becomes `"unknown"`.
pub fn sanitize(raw: &str) -> String {
    let cleaned: String = raw.chars().map(|c| if c == '/' || c == '\\' { '-' } else { c }).collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

pub fn workspace_path(workspaces_root: &Path, repo_id: &str, task_id: &str) -> PathBuf {
    workspaces_root.join(sanitize(repo_id)).join("tasks").join(sanitize(task_id))
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
