// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn same_key_is_serialized() {
    let table = Arc::new(GitLockTable::new());
    let order = Arc::new(SyncMutex::new(Vec::new()));

    let t1 = {
        let table = table.clone();
        let order = order.clone();
        tokio::spawn(async move {
            let _guard = table.lock("repo", "task").await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            order.lock().push(1);
        })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    let t2 = {
        let table = table.clone();
        let order = order.clone();
        tokio::spawn(async move {
            let _guard = table.lock("repo", "task").await;
            order.lock().push(2);
        })
    };

    t1.await.unwrap();
    t2.await.unwrap();
    assert_eq!(*order.lock(), vec![1, 2]);
}

#[tokio::test]
async fn different_keys_do_not_contend() {
    let table = GitLockTable::new();
    let g1 = table.lock("repo-a", "task-1").await;
    let g2 = table.lock("repo-b", "task-1").await;
    drop(g1);
    drop(g2);
}

#[tokio::test]
async fn key_matching_is_case_insensitive() {
    let table = GitLockTable::new();
    let guard = table.lock("Repo", "Task").await;
    drop(guard);
    // Re-acquiring under different casing must hit the same entry, not a
    // second independent one.
    let _guard = table.lock("repo", "task").await;
    assert_eq!(table.len(), 1);
}

#[tokio::test]
async fn sweep_idle_removes_unused_entries_but_keeps_held_ones() {
    let table = GitLockTable::new();
    let held = table.lock("repo", "held").await;
    {
        let _released = table.lock("repo", "released").await;
    }

    table.sweep_idle();
    assert_eq!(table.len(), 1);
    drop(held);
}
