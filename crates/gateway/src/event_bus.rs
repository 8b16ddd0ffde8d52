// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`EventBus`]: the control-plane-facing sink the processor publishes
//! [`JobEvent`]s to. The transport that carries these onward is out of
//! scope here -- this is the interface boundary.

use gw_core::RunId;
use gw_wire::StructuredProjection;
use serde_json::Value;

/// One event published for a job, after the processor has classified an
/// inbound chunk or reached a terminal state.
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub run_id: RunId,
    pub event_type: String,
    pub summary: String,
    pub sequence: i64,
    pub category: String,
    pub payload_json: Option<Value>,
    pub schema_version: String,
    pub timestamp_ms: u64,
}

impl JobEvent {
    pub fn log(run_id: RunId, summary: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            run_id,
            event_type: "log".to_string(),
            summary: summary.into(),
            sequence: 0,
            category: String::new(),
            payload_json: None,
            schema_version: String::new(),
            timestamp_ms,
        }
    }

    pub fn completed(run_id: RunId, envelope_json: Value, timestamp_ms: u64) -> Self {
        Self {
            run_id,
            event_type: "completed".to_string(),
            summary: "completed".to_string(),
            sequence: 0,
            category: String::new(),
            payload_json: Some(envelope_json),
            schema_version: String::new(),
            timestamp_ms,
        }
    }

    /// A chunk that parsed as a well-formed wire envelope and was
    /// successfully projected into a canonical category.
    pub fn log_chunk(run_id: RunId, sequence: i64, projection: &StructuredProjection, timestamp_ms: u64) -> Self {
        Self {
            run_id,
            event_type: "log_chunk".to_string(),
            summary: String::new(),
            sequence,
            category: projection.category.clone(),
            payload_json: Some(projection.payload.clone()),
            schema_version: projection.schema_version.clone(),
            timestamp_ms,
        }
    }

    /// A chunk that did not parse as a wire envelope -- surfaced as an
    /// opaque log line rather than dropped.
    pub fn opaque_chunk(run_id: RunId, raw: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            run_id,
            event_type: "log_chunk".to_string(),
            summary: raw.into(),
            sequence: 0,
            category: String::new(),
            payload_json: None,
            schema_version: String::new(),
            timestamp_ms,
        }
    }
}

/// Receives published [`JobEvent`]s. Implementors must be safe to call
/// concurrently -- one per in-flight job at minimum.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: JobEvent);
}

/// An `EventBus` with no registered subscriber; publishing is a no-op.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn publish(&self, _event: JobEvent) {}
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
