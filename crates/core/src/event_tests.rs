// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn display_matches_wire_type_strings() {
    assert_eq!(CanonicalEventType::AssistantDelta.to_string(), "assistant.delta");
    assert_eq!(CanonicalEventType::DiffUpdated.to_string(), "diff.updated");
    assert_eq!(CanonicalEventType::RunCompleted.to_string(), "run.completed");
}

#[test]
fn is_blank_detects_whitespace_only_content() {
    let event = CanonicalEvent::new(CanonicalEventType::AssistantDelta, "   \n\t");
    assert!(event.is_blank());
    let event = CanonicalEvent::new(CanonicalEventType::AssistantDelta, "hi");
    assert!(!event.is_blank());
}

#[test]
fn with_metadata_accumulates_entries() {
    let event = CanonicalEvent::new(CanonicalEventType::Error, "boom")
        .with_metadata("code", "500")
        .with_metadata("source", "runtime");
    assert_eq!(event.metadata.get("code").map(String::as_str), Some("500"));
    assert_eq!(event.metadata.len(), 2);
}
