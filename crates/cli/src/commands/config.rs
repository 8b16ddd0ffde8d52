// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gwctl config` - print the effective configuration this process would
//! start a gateway with, as resolved from the environment.

use anyhow::Result;
use gw_core::GatewayConfig;

use crate::output::OutputFormat;

pub fn handle(format: OutputFormat) -> Result<()> {
    let config = GatewayConfig::from_env();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "max_slots": config.max_slots,
                    "storage_root": config.storage_root,
                    "workspaces_root": config.workspaces_root,
                    "shutdown_timeout_secs": config.shutdown_timeout.as_secs(),
                    "default_artifact_max_count": config.default_artifact_max_count,
                    "default_artifact_max_bytes": config.default_artifact_max_bytes,
                    "reconcile_interval_secs": config.reconcile_interval.as_secs(),
                    "health_ping_interval_secs": config.health_ping_interval.as_secs(),
                    "health_ping_deadline_secs": config.health_ping_deadline.as_secs(),
                    "health_stale_after_secs": config.health_stale_after.as_secs(),
                    "heartbeat_interval_secs": config.heartbeat_interval.as_secs(),
                    "heartbeat_warmup_secs": config.heartbeat_warmup.as_secs(),
                    "image_allow_list": config.image_allow_list,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("max_slots:            {}", config.max_slots);
            println!("storage_root:         {}", config.storage_root.display());
            println!("workspaces_root:      {}", config.workspaces_root.display());
            println!("shutdown_timeout:     {}s", config.shutdown_timeout.as_secs());
            println!(
                "artifact policy:      {} files / {} bytes",
                config.default_artifact_max_count, config.default_artifact_max_bytes
            );
            println!("reconcile_interval:   {}s", config.reconcile_interval.as_secs());
            println!(
                "health ping:          every {}s, {}s deadline, stale after {}s",
                config.health_ping_interval.as_secs(),
                config.health_ping_deadline.as_secs(),
                config.health_stale_after.as_secs()
            );
            println!(
                "heartbeat:            every {}s, {}s warmup",
                config.heartbeat_interval.as_secs(),
                config.heartbeat_warmup.as_secs()
            );
            match &config.image_allow_list {
                Some(list) => println!("image_allow_list:     {}", list.join(", ")),
                None => println!("image_allow_list:     (unrestricted)"),
            }
        }
    }

    Ok(())
}
