// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`WireEnvelope`]: a single live event framed with the protocol marker
//! and a per-run monotonic sequence number.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Protocol marker stamped on every wire envelope. Callers use this (plus
/// a non-zero `sequence`) to distinguish a structured chunk from an opaque
/// log line emitted by a harness.
pub const WIRE_MARKER: &str = "agentsdashboard.harness-runtime-event.v1";

/// A single live event, framed for transmission to the control plane.
/// `sequence` is strictly monotonic per run; it is assigned by
/// [`crate::sink::RunEventSink`] using a per-run atomic counter, so gaps are
/// possible (dropped blank content) but never repeats or reversals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEnvelope {
    pub marker: String,
    pub sequence: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl WireEnvelope {
    pub fn new(sequence: i64, event_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            marker: WIRE_MARKER.to_string(),
            sequence,
            event_type: event_type.into(),
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether this envelope carries the expected marker and a positive
    /// sequence -- the check the processor uses to tell a structured chunk
    /// from an opaque `log_chunk`.
    pub fn is_well_formed(&self) -> bool {
        self.marker == WIRE_MARKER && self.sequence > 0
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
