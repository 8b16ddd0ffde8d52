// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sink: turns [`CanonicalEvent`]s into sequenced [`WireEnvelope`]s
//! and hands the serialized bytes to a caller-supplied callback.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use gw_core::{CanonicalEvent, CanonicalEventType};

use crate::envelope::WireEnvelope;

/// Receives a serialized wire envelope's bytes. Implementors must be safe
/// to call concurrently from the runtime's stdout/stderr reader tasks.
pub trait ChunkCallback: Send + Sync {
    fn on_chunk(&self, bytes: Vec<u8>);
}

impl<F: Fn(Vec<u8>) + Send + Sync> ChunkCallback for F {
    fn on_chunk(&self, bytes: Vec<u8>) {
        self(bytes)
    }
}

/// A single-run-scoped sink with an atomic sequence counter starting at 0.
/// `publish` drops events whose content is empty/whitespace, assigns
/// `sequence = ++counter`, serializes the envelope, and invokes the
/// callback. Ordering of sequences equals the program order of calls on
/// this sink -- concurrent callers race only on the atomic increment, never
/// on which sequence number they get.
pub struct RunEventSink {
    counter: AtomicI64,
    callback: Arc<dyn ChunkCallback>,
}

impl RunEventSink {
    pub fn new(callback: Arc<dyn ChunkCallback>) -> Self {
        Self { counter: AtomicI64::new(0), callback }
    }

    /// A sink with no registered callback; publishing is a no-op beyond
    /// sequence bookkeeping. Used when a run has no live subscriber.
    pub fn null() -> Self {
        Self::new(Arc::new(NullCallback))
    }

    pub fn publish(&self, event: &CanonicalEvent) {
        if event.is_blank() {
            return;
        }
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut envelope =
            WireEnvelope::new(sequence, event.event_type.to_string(), event.content.clone());
        if !event.metadata.is_empty() {
            envelope = envelope.with_metadata(event.metadata.clone());
        }
        if let Ok(bytes) = envelope.to_json_bytes() {
            self.callback.on_chunk(bytes);
        }
    }

    /// Convenience for runtimes that only need to report free-text
    /// lifecycle/log lines without building a full `CanonicalEvent`.
    pub fn publish_log(&self, content: impl Into<String>) {
        self.publish(&CanonicalEvent::new(CanonicalEventType::RunLifecycle, content));
    }

    pub fn sequence(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }
}

struct NullCallback;

impl ChunkCallback for NullCallback {
    fn on_chunk(&self, _bytes: Vec<u8>) {}
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
