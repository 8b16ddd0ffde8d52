// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::{Arc, Mutex};

use super::*;

fn recording_sink() -> (RunEventSink, Arc<Mutex<Vec<WireEnvelope>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let recorder = received.clone();
    let sink = RunEventSink::new(Arc::new(move |bytes: Vec<u8>| {
        let envelope: WireEnvelope = serde_json::from_slice(&bytes).unwrap();
        recorder.lock().unwrap().push(envelope);
    }));
    (sink, received)
}

#[test]
fn sequence_is_strictly_monotonic_across_publishes() {
    let (sink, received) = recording_sink();
    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, "a"));
    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, "b"));
    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, "c"));

    let envelopes = received.lock().unwrap();
    let sequences: Vec<i64> = envelopes.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[test]
fn blank_content_is_dropped_without_consuming_a_sequence() {
    let (sink, received) = recording_sink();
    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, "   "));
    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, "real"));

    let envelopes = received.lock().unwrap();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].sequence, 1);
    assert_eq!(envelopes[0].content, "real");
}

#[test]
fn null_sink_accepts_publishes_without_a_callback() {
    let sink = RunEventSink::null();
    sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, "ignored"));
    assert_eq!(sink.sequence(), 1);
}

#[test]
fn metadata_is_omitted_when_event_carries_none() {
    let (sink, received) = recording_sink();
    sink.publish(&CanonicalEvent::new(CanonicalEventType::RunLifecycle, "started"));
    let envelopes = received.lock().unwrap();
    assert!(envelopes[0].metadata.is_none());
}

#[test]
fn concurrent_publishes_never_repeat_a_sequence() {
    use std::thread;

    let (sink, received) = recording_sink();
    let sink = Arc::new(sink);
    let mut handles = Vec::new();
    for i in 0..8 {
        let sink = sink.clone();
        handles.push(thread::spawn(move || {
            sink.publish(&CanonicalEvent::new(CanonicalEventType::AssistantDelta, format!("msg-{i}")));
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let envelopes = received.lock().unwrap();
    let mut sequences: Vec<i64> = envelopes.iter().map(|e| e.sequence).collect();
    sequences.sort_unstable();
    sequences.dedup();
    assert_eq!(sequences.len(), 8);
}
