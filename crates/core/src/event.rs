// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`CanonicalEvent`]: the vendor-agnostic event type every harness runtime
//! produces. The event sink (`gw-wire`) wraps these into wire envelopes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical, vendor-agnostic event categories. Harness runtimes translate
/// their native protocol into these; the event sink assigns sequencing and
/// the processor projects them into [`StructuredProjection`] categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalEventType {
    ReasoningDelta,
    AssistantDelta,
    CommandDelta,
    DiffUpdated,
    RunLifecycle,
    RunCompleted,
    Error,
    UsageUpdated,
}

crate::simple_display! {
    CanonicalEventType {
        ReasoningDelta => "reasoning.delta",
        AssistantDelta => "assistant.delta",
        CommandDelta => "command.delta",
        DiffUpdated => "diff.updated",
        RunLifecycle => "run.lifecycle",
        RunCompleted => "run.completed",
        Error => "error",
        UsageUpdated => "usage.updated",
    }
}

/// One event produced by a harness runtime, before the sink assigns it a
/// sequence number and wraps it into a wire envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEvent {
    #[serde(rename = "type")]
    pub event_type: CanonicalEventType,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CanonicalEvent {
    pub fn new(event_type: CanonicalEventType, content: impl Into<String>) -> Self {
        Self { event_type, content: content.into(), metadata: HashMap::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the content is empty or all-whitespace; the sink drops these.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
