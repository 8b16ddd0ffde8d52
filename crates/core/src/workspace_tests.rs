// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_stores_all_fields() {
    let ctx = WorkspaceContext::new("/tmp/ws", "main", "deadbeef");
    assert_eq!(ctx.workspace_path, PathBuf::from("/tmp/ws"));
    assert_eq!(ctx.main_branch, "main");
    assert_eq!(ctx.head_before_run, "deadbeef");
}
