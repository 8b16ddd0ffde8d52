// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical category projection: the processor-side mapping from a
//! harness's native event/category names to the wire's canonical set.

use serde_json::Value;

/// Default schema version stamped on a projected chunk when the request
/// carries no `structured_protocol_version` hint.
pub const DEFAULT_SCHEMA_VERSION: &str = "harness-structured-event-v2";

/// A chunk after category projection: the canonical category name, its
/// JSON payload, and the resolved schema version.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredProjection {
    pub category: String,
    pub payload: Value,
    pub schema_version: String,
}

impl StructuredProjection {
    pub fn new(category: impl Into<String>, payload: Value) -> Self {
        Self { category: category.into(), payload, schema_version: DEFAULT_SCHEMA_VERSION.to_string() }
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }
}

/// Normalise a harness-native category/event name to one of the canonical
/// wire types. Returns `None` for names with no defined mapping (the
/// caller should then fall back to treating the chunk as opaque).
pub fn normalize_category(name: &str) -> Option<&'static str> {
    match name {
        "reasoning_delta" => Some("reasoning.delta"),
        "assistant_delta" => Some("assistant.delta"),
        "command_output" => Some("command.delta"),
        "diff_update" | "session.diff" => Some("diff.updated"),
        "diagnostic" => Some("error"),
        "completion" => Some("run.completed"),
        "log" | "session.status" | "session.idle" => Some("run.lifecycle"),
        "session.usage" | "usage.updated" => Some("usage.updated"),
        other if other.starts_with("message.part.") => Some("assistant.delta"),
        _ => None,
    }
}

/// Build a [`StructuredProjection`] from a wire envelope's `type`/`content`,
/// honouring the "embedded structured event" rule: if `content` itself
/// parses as a JSON object carrying a `type` field, it is lifted in place
/// as the payload, and its own `schemaVersion` field (if present) overrides
/// the default.
pub fn project(event_type: &str, content: &str, requested_schema_version: Option<&str>) -> StructuredProjection {
    let category = normalize_category(event_type).unwrap_or(event_type).to_string();
    let default_schema = requested_schema_version
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_SCHEMA_VERSION.to_string());

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
        if map.contains_key("type") {
            let schema_version = map
                .get("schemaVersion")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(default_schema);
            return StructuredProjection::new(category, Value::Object(map))
                .with_schema_version(schema_version);
        }
    }

    StructuredProjection::new(category, payload_for(&category, content)).with_schema_version(default_schema)
}

/// Wrap plain-text content into the payload shape expected for its
/// category (`text|thinking|output|diffPatch|message|status`).
fn payload_for(category: &str, content: &str) -> Value {
    let key = match category {
        "reasoning.delta" => "thinking",
        "assistant.delta" => "text",
        "command.delta" => "output",
        "diff.updated" => "diffPatch",
        "run.lifecycle" => "status",
        _ => "message",
    };
    serde_json::json!({ key: content })
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
