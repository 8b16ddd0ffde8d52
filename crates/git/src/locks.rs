// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide, case-insensitive map of `(repo_id:task_id) -> mutex`,
//! created on demand. A job holds at most one such mutex, for the
//! duration of prep and finalization.
//!
//! Entries are reference-counted and removed once their use count returns
//! to zero, so the map does not grow unboundedly across a long-running
//! daemon's lifetime (per the per-task mutex map design note).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct GitLockTable {
    entries: SyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl GitLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutex for `(repo_id, task_id)`, creating it if absent.
    /// The returned guard holds a strong reference to the entry for as
    /// long as it is alive; once the last guard for a key drops, the next
    /// `lock` call for that key may find and reuse the same entry (if it
    /// hasn't been swept) or recreate it.
    pub async fn lock(&self, repo_id: &str, task_id: &str) -> OwnedMutexGuard<()> {
        let key = Self::key(repo_id, task_id);
        let entry = {
            let mut entries = self.entries.lock();
            entries.entry(key).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
        };
        entry.lock_owned().await
    }

    /// Drop any table entries with no outstanding guards and no current
    /// waiters. Safe to call periodically (e.g. alongside the orphan
    /// reconciler) to bound the table's size.
    pub fn sweep_idle(&self) {
        let mut entries = self.entries.lock();
        entries.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(repo_id: &str, task_id: &str) -> String {
        format!("{}:{}", repo_id.to_ascii_lowercase(), task_id.to_ascii_lowercase())
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
