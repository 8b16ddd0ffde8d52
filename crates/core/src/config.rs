// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide tunables, read once at startup from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Default values mirror the constants named throughout the component
/// design: 30s reconcile/health cadence, 5s health deadline, 90s staleness,
/// 50 artifacts / 100 MiB artifact policy defaults.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Maximum number of jobs the queue will hold active simultaneously.
    pub max_slots: usize,
    /// Root directory for per-run artifact extraction.
    pub storage_root: PathBuf,
    /// Root directory for per-(repo,task) git workspaces.
    pub workspaces_root: PathBuf,
    /// How long the processor waits for in-flight jobs to drain on shutdown.
    pub shutdown_timeout: Duration,
    pub default_artifact_max_count: usize,
    pub default_artifact_max_bytes: u64,
    pub reconcile_interval: Duration,
    pub health_ping_interval: Duration,
    pub health_ping_deadline: Duration,
    pub health_stale_after: Duration,
    pub heartbeat_interval: Duration,
    pub heartbeat_warmup: Duration,
    /// Optional allow-list of container images. Entries ending in `*` match
    /// by prefix; everything else matches exactly, case-insensitively.
    pub image_allow_list: Option<Vec<String>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_slots: 4,
            storage_root: PathBuf::from("/var/lib/gateway/artifacts"),
            workspaces_root: PathBuf::from("/var/lib/gateway/workspaces"),
            shutdown_timeout: Duration::from_secs(30),
            default_artifact_max_count: 50,
            default_artifact_max_bytes: 100 * 1024 * 1024,
            reconcile_interval: Duration::from_secs(30),
            health_ping_interval: Duration::from_secs(30),
            health_ping_deadline: Duration::from_secs(5),
            health_stale_after: Duration::from_secs(90),
            heartbeat_interval: Duration::from_secs(30),
            heartbeat_warmup: Duration::from_secs(5),
            image_allow_list: None,
        }
    }
}

impl GatewayConfig {
    /// Build configuration from environment variables, falling back to
    /// [`GatewayConfig::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_slots: env_usize("GATEWAY_MAX_SLOTS").unwrap_or(defaults.max_slots),
            storage_root: env_path("GATEWAY_STORAGE_ROOT").unwrap_or(defaults.storage_root),
            workspaces_root: env_path("GATEWAY_WORKSPACES_ROOT")
                .unwrap_or(defaults.workspaces_root),
            shutdown_timeout: env_secs("GATEWAY_SHUTDOWN_TIMEOUT_SECS")
                .unwrap_or(defaults.shutdown_timeout),
            default_artifact_max_count: env_usize("GATEWAY_ARTIFACT_MAX_COUNT")
                .unwrap_or(defaults.default_artifact_max_count),
            default_artifact_max_bytes: env_u64("GATEWAY_ARTIFACT_MAX_BYTES")
                .unwrap_or(defaults.default_artifact_max_bytes),
            reconcile_interval: env_secs("GATEWAY_RECONCILE_INTERVAL_SECS")
                .unwrap_or(defaults.reconcile_interval),
            health_ping_interval: defaults.health_ping_interval,
            health_ping_deadline: defaults.health_ping_deadline,
            health_stale_after: defaults.health_stale_after,
            heartbeat_interval: defaults.heartbeat_interval,
            heartbeat_warmup: defaults.heartbeat_warmup,
            image_allow_list: std::env::var("GATEWAY_IMAGE_ALLOW_LIST")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect()),
        }
    }

    /// Whether `image` passes the allow-list, if one is configured.
    pub fn image_allowed(&self, image: &str) -> bool {
        let Some(list) = &self.image_allow_list else {
            return true;
        };
        let image = image.to_ascii_lowercase();
        list.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_suffix('*') {
                Some(prefix) => image.starts_with(prefix),
                None => image == pattern,
            }
        })
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_u64(key).map(Duration::from_secs)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
