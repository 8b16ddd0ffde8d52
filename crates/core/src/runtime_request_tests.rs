// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::request::DispatchRequest;

#[test]
fn from_dispatch_derives_artifacts_path_from_run_id() {
    let req = DispatchRequest::builder().build();
    let run_id = req.run_id;
    let storage_root = Path::new("/var/lib/gateway/artifacts");
    let run_req = HarnessRunRequest::from_dispatch(&req, "command", None, storage_root);
    assert_eq!(
        run_req.artifacts_host_path,
        storage_root.join(run_id.as_str())
    );
    assert_eq!(run_req.mode, "command");
    assert!(run_req.workspace_path.is_none());
}

#[test]
fn from_dispatch_carries_workspace_path_through() {
    let req = DispatchRequest::builder().build();
    let ws = PathBuf::from("/tmp/ws/repo/tasks/t1");
    let run_req =
        HarnessRunRequest::from_dispatch(&req, "plan", Some(ws.clone()), Path::new("/artifacts"));
    assert_eq!(run_req.workspace_path, Some(ws));
}
